//! `pantry-restore`
//!
//! Decrypts one dump file chosen on the command line.

use std::path::{Path, PathBuf};

use crate::config::paths::PantryPaths;
use crate::config::settings::Settings;
use crate::diagnostics::DiagnosticEntry;
use crate::error::PantryResult;
use crate::restore::{run_restore, FixedOutput, OutputChooser, RestoreOutcome, RestoreSession};

use super::backup::open_diagnostics;
use super::terminal::{PromptOutput, TerminalPasswordProvider};

/// Restore `input`, writing to `output` or to a path asked for on stdin
pub fn restore_file(
    paths: &PantryPaths,
    settings: &Settings,
    input: &Path,
    output: Option<PathBuf>,
) -> PantryResult<RestoreOutcome> {
    let diagnostics = open_diagnostics(paths, settings);

    let session = match RestoreSession::open(input) {
        Ok(session) => session,
        Err(err) => {
            diagnostics.record(&DiagnosticEntry::from_error(None, "restore.open", &err));
            return Err(err);
        }
    };

    let mut chooser: Box<dyn OutputChooser> = match output {
        Some(path) => Box::new(FixedOutput(Some(path))),
        None => Box::new(PromptOutput),
    };

    run_restore(
        session,
        &mut TerminalPasswordProvider::new(),
        chooser.as_mut(),
        &diagnostics,
    )
}

//! Restore of encrypted dump files
//!
//! A restore opens one dump, asks for a password, and decrypts every line.
//! A wrong password never ends the session: the operator is told which line
//! failed and asked again, against the same input. Only a fully decrypted
//! input is written out, verbatim, to the file the operator picks.
//!
//! # Example
//!
//! ```rust,ignore
//! use pantry_backup::restore::{run_restore, FixedOutput, RestoreSession};
//!
//! let session = RestoreSession::open(&input)?;
//! let outcome = run_restore(session, &mut passwords, &mut FixedOutput(Some(out)), &diagnostics)?;
//! println!("Restored {} lines to {}", outcome.lines, outcome.output_path.display());
//! ```

mod output;
mod session;

pub use output::{save_output, with_sql_extension, FixedOutput, OutputChooser};
pub use session::RestoreSession;

use std::path::PathBuf;

use crate::diagnostics::{DiagnosticEntry, DiagnosticLog};
use crate::error::{PantryError, PantryResult};
use crate::operator::{acquire_password, PasswordProvider};

/// Prompt shown for each restore attempt
pub const DECRYPTION_PROMPT: &str = "Enter decryption password: ";

/// Result of a successful restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub output_path: PathBuf,
    /// Records restored
    pub lines: usize,
    /// Password attempts it took
    pub attempts: u32,
}

/// Run a restore session until it saves output, is cancelled, or fails
pub fn run_restore(
    mut session: RestoreSession,
    passwords: &mut dyn PasswordProvider,
    chooser: &mut dyn OutputChooser,
    diagnostics: &DiagnosticLog,
) -> PantryResult<RestoreOutcome> {
    let result = restore_inner(&mut session, passwords, chooser, diagnostics);

    if let Err(err) = &result {
        if err.is_fatal() {
            diagnostics.record(&DiagnosticEntry::from_error(
                Some(session.id()),
                "restore",
                err,
            ));
        }
    }
    result
}

fn restore_inner(
    session: &mut RestoreSession,
    passwords: &mut dyn PasswordProvider,
    chooser: &mut dyn OutputChooser,
    diagnostics: &DiagnosticLog,
) -> PantryResult<RestoreOutcome> {
    let lines = loop {
        let password = acquire_password(passwords, DECRYPTION_PROMPT)?;
        match session.attempt(&password) {
            Ok(lines) => break lines,
            Err(err @ PantryError::Decryption { .. }) => {
                diagnostics.record(&DiagnosticEntry::warning(
                    Some(session.id()),
                    "restore.decrypt",
                    format!("{}: {}", session.input_path().display(), err),
                ));
                passwords.reject(&err.to_string());
            }
            Err(err) => return Err(err),
        }
    };

    let chosen = chooser.choose_output()?.ok_or(PantryError::NoOutput)?;
    let output_path = with_sql_extension(chosen);
    save_output(&output_path, &lines)?;

    Ok(RestoreOutcome {
        output_path,
        lines: lines.len(),
        attempts: session.attempts(),
    })
}

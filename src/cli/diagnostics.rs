//! `pantry-backup errors`

use crate::config::paths::PantryPaths;
use crate::config::settings::Settings;
use crate::error::PantryResult;

use super::backup::open_diagnostics;

/// Print the most recent diagnostic entries, oldest first
pub fn show_errors(paths: &PantryPaths, settings: &Settings, limit: usize) -> PantryResult<()> {
    let diagnostics = open_diagnostics(paths, settings);
    let entries = diagnostics.read_recent(limit)?;

    if entries.is_empty() {
        println!("No diagnostic entries recorded.");
        return Ok(());
    }

    if let Some(path) = diagnostics.path() {
        println!("Diagnostic log: {}", path.display());
        println!();
    }
    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}

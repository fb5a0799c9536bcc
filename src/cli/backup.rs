//! `pantry-backup run`
//!
//! Wires the settings, record source, remote store and terminal front end
//! into one backup job and waits for it to finish.

use crate::backup::{BackupConfig, BackupJob, BackupOrchestrator, BackupReport};
use crate::config::paths::PantryPaths;
use crate::config::settings::Settings;
use crate::diagnostics::{DiagnosticEntry, DiagnosticLog};
use crate::error::{PantryError, PantryResult};
use crate::operator::CancellationToken;
use crate::remote::{self, RemoteStore};
use crate::storage::JsonRecordSource;

use super::terminal::{TerminalPasswordProvider, TerminalProgress};

/// Open the diagnostic log the settings point at, announcing any fallback
pub fn open_diagnostics(paths: &PantryPaths, settings: &Settings) -> DiagnosticLog {
    let diagnostics = DiagnosticLog::resolve(
        settings.error_log_directory.as_deref(),
        &paths.fallback_error_dir(),
    );
    if let Some(notice) = diagnostics.fallback_notice() {
        eprintln!("Warning: {}", notice);
    }
    diagnostics
}

/// Run one backup from the terminal
pub fn run_backup(paths: &PantryPaths, settings: &Settings) -> PantryResult<BackupReport> {
    let diagnostics = open_diagnostics(paths, settings);

    let orchestrator = match prepare(paths, settings, diagnostics.clone()) {
        Ok(orchestrator) => orchestrator,
        Err(err) => {
            diagnostics.record(&DiagnosticEntry::from_error(None, "backup.setup", &err));
            return Err(err);
        }
    };

    install_interrupt_handler(orchestrator.cancellation())?;

    let job = BackupJob::spawn(orchestrator, TerminalPasswordProvider::new(), TerminalProgress::new())?;
    job.join()
}

fn prepare(
    paths: &PantryPaths,
    settings: &Settings,
    diagnostics: DiagnosticLog,
) -> PantryResult<BackupOrchestrator> {
    settings.validate()?;

    let source = JsonRecordSource::open(paths.clone())?;
    let remote: Option<Box<dyn RemoteStore>> = if settings.remote_backup.enabled {
        Some(remote::from_settings(&settings.remote_backup)?)
    } else {
        None
    };

    Ok(BackupOrchestrator::new(
        BackupConfig::from_settings(settings, paths),
        Box::new(source),
        remote,
        diagnostics,
    ))
}

/// Ctrl-C cancels at the next step boundary; the job still closes the source
fn install_interrupt_handler(cancel: CancellationToken) -> PantryResult<()> {
    ctrlc::set_handler(move || {
        on_interrupt(&cancel);
    })
    .map_err(|e| PantryError::Config(format!("Failed to install Ctrl-C handler: {}", e)))
}

/// Returns true for the interrupt that started the cancellation
fn on_interrupt(cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        eprintln!("\nAlready cancelling; waiting for the current step to finish.");
        return false;
    }
    cancel.cancel();
    eprintln!("\nCancelling after the current step.");
    true
}

/// Print what each collection ended up as
pub fn print_report(report: &BackupReport) {
    if report.outcomes.is_empty() {
        return;
    }

    println!();
    for outcome in &report.outcomes {
        let status = match (&outcome.upload_error, outcome.uploaded) {
            (Some(_), _) => "upload failed",
            (None, true) => "uploaded",
            (None, false) => "written",
        };
        println!(
            "  {:<13} {:>6} records  {}  ({})",
            outcome.collection.to_string(),
            outcome.line_count,
            outcome.file_name,
            status
        );
        if let Some(path) = &outcome.local_path {
            println!("  {:<13} {}", "", path.display());
        }
    }
}

//! Encrypted backup of the pantry dataset
//!
//! A backup run produces one dump file per collection. Every record becomes
//! one `INSERT` statement, every statement is encrypted on its own, and the
//! dump holds one encrypted line per record.
//!
//! # Architecture
//!
//! - `BackupOrchestrator`: drives one run through its states and reports
//!   progress to a `ProgressSink`
//! - `BackupJob`: runs an orchestrator on a worker thread
//! - `write_dump`: writes a dump file atomically
//!
//! # Destinations
//!
//! Dumps are written to the local backup directory, uploaded to the remote
//! store, or both. When only remote backup is wanted the dump is written to the
//! staging directory and removed once it has been uploaded.
//!
//! # Example
//!
//! ```rust,ignore
//! use pantry_backup::backup::{BackupConfig, BackupOrchestrator};
//!
//! let config = BackupConfig::from_settings(&settings, &paths);
//! let orchestrator = BackupOrchestrator::new(config, source, remote, diagnostics);
//! let report = orchestrator.run(&mut passwords, &mut progress);
//! println!("{}", report.message);
//! ```

mod dump;
mod job;
mod orchestrator;

pub use dump::{dump_file_name, write_dump, DumpFile, DUMP_EXTENSION};
pub use job::BackupJob;
pub use orchestrator::{
    fetch_statements, BackupConfig, BackupOrchestrator, BackupReport, BackupState,
    CollectionOutcome, Destinations, PROGRESS_MAX,
};

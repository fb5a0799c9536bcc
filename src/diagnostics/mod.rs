//! Diagnostic logging for backup and restore runs
//!
//! Every fatal condition is recorded in an append-only diagnostic log before
//! the operator is told about it.
//!
//! # Architecture
//!
//! - `DiagnosticEntry`: one record with timestamp, severity, the run it
//!   belongs to, a short context label, the message and its cause chain.
//! - `DiagnosticLog`: writes entries to `diagnostics.log` as line-delimited
//!   JSON (JSONL), flushing after every entry.
//!
//! # Example
//!
//! ```rust,ignore
//! use pantry_backup::diagnostics::{DiagnosticEntry, DiagnosticLog};
//!
//! let log = DiagnosticLog::resolve(settings.error_log_directory.as_deref(), &paths.fallback_error_dir());
//! log.record(&DiagnosticEntry::from_error(Some(run_id), "backup", &err));
//! ```

mod entry;
mod logger;

pub use entry::{DiagnosticEntry, Severity};
pub use logger::{DiagnosticLog, LOG_FILE_NAME};

//! Diagnostic logger for the append-only diagnostic log
//!
//! Each entry is written as a single JSON line and flushed immediately.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{PantryError, PantryResult};
use crate::storage::file_io::is_writable_dir;

use super::entry::DiagnosticEntry;

/// File name of the diagnostic log inside its directory
pub const LOG_FILE_NAME: &str = "diagnostics.log";

/// Handles writing diagnostic entries to the log file
///
/// The log file uses a line-delimited JSON format (JSONL) where each line
/// is a complete JSON object representing one entry.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    /// Path to the log file, `None` when no directory could be used
    log_path: Option<PathBuf>,
    /// Why the configured directory was not used
    fallback_notice: Option<String>,
}

impl DiagnosticLog {
    /// Create a logger that writes to the specified file
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path: Some(log_path),
            fallback_notice: None,
        }
    }

    /// A logger that drops every entry
    pub fn disabled() -> Self {
        Self {
            log_path: None,
            fallback_notice: None,
        }
    }

    /// Pick the log directory: the configured one if usable, else the fallback
    ///
    /// When neither directory can be written to the logger is disabled and
    /// the notice explains why.
    pub fn resolve(configured: Option<&Path>, fallback: &Path) -> Self {
        let mut notice = None;

        if let Some(dir) = configured {
            if !dir.is_dir() {
                notice = Some(format!(
                    "Error log directory {} does not exist; using {}",
                    dir.display(),
                    fallback.display()
                ));
            } else if !is_writable_dir(dir) {
                notice = Some(format!(
                    "No write permission for error log directory {}; using {}",
                    dir.display(),
                    fallback.display()
                ));
            } else {
                return Self::new(dir.join(LOG_FILE_NAME));
            }
        }

        if fs::create_dir_all(fallback).is_ok() && is_writable_dir(fallback) {
            return Self {
                log_path: Some(fallback.join(LOG_FILE_NAME)),
                fallback_notice: notice,
            };
        }

        Self {
            log_path: None,
            fallback_notice: Some(format!(
                "Cannot write to {}; errors will not be logged to a file",
                fallback.display()
            )),
        }
    }

    /// Log an entry
    ///
    /// Appends the entry as a JSON line and flushes immediately.
    pub fn log(&self, entry: &DiagnosticEntry) -> PantryResult<()> {
        let Some(log_path) = &self.log_path else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .map_err(|e| PantryError::Io(format!("Failed to open diagnostic log: {}", e)))?;

        let json = serde_json::to_string(entry)
            .map_err(|e| PantryError::Json(format!("Failed to serialize diagnostic entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| PantryError::Io(format!("Failed to write diagnostic entry: {}", e)))?;

        file.flush()
            .map_err(|e| PantryError::Io(format!("Failed to flush diagnostic log: {}", e)))?;

        Ok(())
    }

    /// Log an entry, reporting a logging failure on stderr instead of returning it
    pub fn record(&self, entry: &DiagnosticEntry) {
        if let Err(e) = self.log(entry) {
            eprintln!("Warning: could not record diagnostic entry: {}", e);
            eprintln!("{}", entry.format_human_readable());
        }
    }

    /// Read all entries from the log file, oldest first
    pub fn read_all(&self) -> PantryResult<Vec<DiagnosticEntry>> {
        let Some(log_path) = &self.log_path else {
            return Ok(Vec::new());
        };
        if !log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(log_path)
            .map_err(|e| PantryError::Io(format!("Failed to open diagnostic log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                PantryError::Io(format!(
                    "Failed to read diagnostic log line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: DiagnosticEntry = serde_json::from_str(&line).map_err(|e| {
                PantryError::Json(format!(
                    "Failed to parse diagnostic entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read the most recent N entries from the log
    pub fn read_recent(&self, count: usize) -> PantryResult<Vec<DiagnosticEntry>> {
        let all_entries = self.read_all()?;
        let start = all_entries.len().saturating_sub(count);
        Ok(all_entries[start..].to_vec())
    }

    /// Get the path to the log file
    pub fn path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Explanation when the configured directory was not used
    pub fn fallback_notice(&self) -> Option<&str> {
        self.fallback_notice.as_deref()
    }
}

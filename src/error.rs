//! Custom error types for the pantry backup tools
//!
//! This module defines the error hierarchy for backup and restore runs using
//! thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for backup and restore operations
#[derive(Error, Debug)]
pub enum PantryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Key derivation or cipher setup errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// The operator dismissed the password prompt
    #[error("Password entry was cancelled")]
    PasswordCancelled,

    /// The two password entries did not match
    #[error("Password not confirmed; fields do not match")]
    PasswordMismatch,

    /// A backup destination cannot be created or written to
    #[error("Backup destination is not writable: {0}")]
    DestinationUnwritable(String),

    /// Records for a collection could not be retrieved
    #[error("Failed to retrieve {collection} data: {reason}")]
    RecordFetch {
        collection: &'static str,
        reason: String,
    },

    /// A dump file could not be created or written
    #[error("Failed to write dump file {}: {reason}", path.display())]
    DumpWrite { path: PathBuf, reason: String },

    /// The remote leg of a backup failed
    #[error("Failed to upload {file}: {reason}")]
    Upload { file: String, reason: String },

    /// A line could not be decrypted with the supplied password
    #[error("Decryption not possible at line {line} - the decryption password is likely invalid")]
    Decryption { line: usize },

    /// The run was cancelled by the operator
    #[error("Operation cancelled")]
    Cancelled,

    /// No output file was chosen for restored data
    #[error("No output file specified")]
    NoOutput,

    /// Restored data would produce an empty output file
    #[error("Nothing to write: the input decrypted to zero bytes")]
    EmptyOutput,
}

impl PantryError {
    /// Create a fetch error for the named collection
    pub fn fetch(collection: &'static str, reason: impl Into<String>) -> Self {
        Self::RecordFetch {
            collection,
            reason: reason.into(),
        }
    }

    /// Create a dump write error for the given path
    pub fn dump_write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DumpWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an upload error for the given file name
    pub fn upload(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Upload {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Errors that are handled by looping back inside the component that raised them
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PasswordMismatch | Self::Decryption { .. })
    }

    /// Errors that end a run with a terminal report
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
            && !matches!(self, Self::PasswordCancelled | Self::Cancelled)
    }

    /// Check if this is a decryption failure
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption { .. })
    }

    /// Short name of the error kind, used as diagnostic context
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "Config",
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
            Self::Encryption(_) => "Encryption",
            Self::PasswordCancelled => "PasswordCancelled",
            Self::PasswordMismatch => "PasswordMismatch",
            Self::DestinationUnwritable(_) => "DestinationUnwritable",
            Self::RecordFetch { .. } => "RecordFetchFailure",
            Self::DumpWrite { .. } => "DumpWriteFailure",
            Self::Upload { .. } => "UploadFailure",
            Self::Decryption { .. } => "DecryptionFailure",
            Self::Cancelled => "Cancelled",
            Self::NoOutput => "NoOutput",
            Self::EmptyOutput => "EmptyOutput",
        }
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for PantryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PantryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for backup and restore operations
pub type PantryResult<T> = Result<T, PantryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PantryError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_fetch_error() {
        let err = PantryError::fetch("client", "connection closed");
        assert_eq!(
            err.to_string(),
            "Failed to retrieve client data: connection closed"
        );
        assert!(err.is_fatal());
        assert_eq!(err.kind(), "RecordFetchFailure");
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(PantryError::PasswordMismatch.is_recoverable());
        assert!(PantryError::Decryption { line: 3 }.is_recoverable());
        assert!(!PantryError::upload("a.sql", "timeout").is_recoverable());
        assert!(!PantryError::Cancelled.is_fatal());
        assert!(!PantryError::PasswordCancelled.is_fatal());
    }

    #[test]
    fn test_dump_write_display() {
        let err = PantryError::dump_write("/tmp/x.sql", "disk full");
        assert_eq!(
            err.to_string(),
            "Failed to write dump file /tmp/x.sql: disk full"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PantryError = io_err.into();
        assert!(matches!(err, PantryError::Io(_)));
    }
}

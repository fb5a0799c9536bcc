//! Storage layer for the pantry dataset
//!
//! Provides the record source a backup reads from, plus JSON file helpers
//! with atomic writes.

pub mod file_io;
pub mod init;
pub mod records;

pub use file_io::{is_writable_dir, read_json, write_json_atomic};
pub use init::initialize_storage;
pub use records::{JsonRecordSource, RecordSource};

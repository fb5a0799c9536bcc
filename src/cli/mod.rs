//! CLI command handlers
//!
//! This module contains the terminal side of the tools: the password prompt,
//! progress bar and output prompt, plus the handlers the binaries call.

pub mod backup;
pub mod diagnostics;
pub mod restore;
pub mod terminal;

pub use backup::{open_diagnostics, print_report, run_backup};
pub use diagnostics::show_errors;
pub use restore::restore_file;
pub use terminal::{PromptOutput, TerminalPasswordProvider, TerminalProgress};

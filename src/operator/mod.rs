//! Capabilities the backup and restore flows need from whoever drives them
//!
//! The flows never talk to a terminal or a window directly. They ask a
//! `PasswordProvider` for passwords, report to a `ProgressSink`, and poll a
//! `CancellationToken`. The `cli` module supplies terminal implementations.

pub mod password;
pub mod progress;

pub use password::{acquire_confirmed_password, acquire_password, PasswordProvider};
pub use progress::{CancellationToken, NullProgress, ProgressSink};

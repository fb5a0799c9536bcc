//! Progress reporting and cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::diagnostics::Severity;

/// Receives phase labels, progress values and operator messages
pub trait ProgressSink: Send {
    /// A new phase started, e.g. "Uploading client data..."
    fn phase(&mut self, label: &str);

    /// Cumulative progress; never decreases within a run
    fn progress(&mut self, value: u32);

    /// A message the operator should see
    fn notify(&mut self, severity: Severity, message: &str);
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn phase(&mut self, label: &str) {
        (**self).phase(label)
    }

    fn progress(&mut self, value: u32) {
        (**self).progress(value)
    }

    fn notify(&mut self, severity: Severity, message: &str) {
        (**self).notify(severity, message)
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn phase(&mut self, _label: &str) {}

    fn progress(&mut self, _value: u32) {}

    fn notify(&mut self, _severity: Severity, _message: &str) {}
}

/// Shared flag the caller sets to request cancellation of a run
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Everything a sink received, shared so tests can inspect it after a run
    #[derive(Debug, Default)]
    pub struct ProgressLog {
        pub phases: Vec<String>,
        pub values: Vec<u32>,
        pub messages: Vec<(Severity, String)>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct RecordingProgress {
        pub log: Arc<Mutex<ProgressLog>>,
        /// Cancel this token once the given phase label is reported
        pub cancel_on_phase: Option<(String, CancellationToken)>,
    }

    impl ProgressSink for RecordingProgress {
        fn phase(&mut self, label: &str) {
            self.log.lock().unwrap().phases.push(label.to_string());
            if let Some((trigger, token)) = &self.cancel_on_phase {
                if trigger == label {
                    token.cancel();
                }
            }
        }

        fn progress(&mut self, value: u32) {
            self.log.lock().unwrap().values.push(value);
        }

        fn notify(&mut self, severity: Severity, message: &str) {
            self.log
                .lock()
                .unwrap()
                .messages
                .push((severity, message.to_string()));
        }
    }
}

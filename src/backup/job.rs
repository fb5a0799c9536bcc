//! Background execution of a backup run
//!
//! The run happens on its own thread so the caller can keep rendering
//! progress and stay responsive to cancellation.

use std::thread::{self, JoinHandle};

use crate::error::{PantryError, PantryResult};
use crate::operator::{CancellationToken, PasswordProvider, ProgressSink};

use super::orchestrator::{BackupOrchestrator, BackupReport};

/// A backup run executing on a worker thread
#[derive(Debug)]
pub struct BackupJob {
    handle: JoinHandle<BackupReport>,
    cancel: CancellationToken,
}

impl BackupJob {
    /// Start the run on a new thread
    pub fn spawn<P, S>(orchestrator: BackupOrchestrator, mut passwords: P, mut sink: S) -> PantryResult<Self>
    where
        P: PasswordProvider + Send + 'static,
        S: ProgressSink + 'static,
    {
        let cancel = orchestrator.cancellation();
        let handle = thread::Builder::new()
            .name("pantry-backup".into())
            .spawn(move || orchestrator.run(&mut passwords, &mut sink))
            .map_err(|e| PantryError::Io(format!("Failed to start backup thread: {}", e)))?;

        Ok(Self { handle, cancel })
    }

    /// Token that cancels the run at the next collection boundary
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to reach a terminal state
    pub fn join(self) -> PantryResult<BackupReport> {
        self.handle
            .join()
            .map_err(|_| PantryError::Io("Backup thread panicked".into()))
    }
}

//! Failure taxonomy of the worker core.
//!
//! None of these reach the host process as a crash. Each is handled where it
//! occurs and surfaced to the user, if at all, as a `jobResult` error or a
//! status event.

use thiserror::Error;

use crate::domain::Worker;

/// Errors produced at the worker boundary.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Executable or script missing, not launchable, or the OS refused the spawn.
    #[error("failed to start {worker}: {reason}")]
    SpawnFailure { worker: Worker, reason: String },

    /// A worker output line could not be decoded.
    #[error("{worker} wrote an unparseable line ({reason}): {line}")]
    ProtocolViolation {
        worker: Worker,
        reason: String,
        line: String,
    },

    /// A worker exited with a nonzero code or was killed.
    #[error("{worker} failed: {message}")]
    WorkerFailure { worker: Worker, message: String },

    /// The termination notification could not be delivered.
    #[error("termination notification failed: {0}")]
    NotificationFailure(String),
}

impl WorkerError {
    pub fn spawn(worker: Worker, err: impl std::fmt::Display) -> Self {
        Self::SpawnFailure {
            worker,
            reason: err.to_string(),
        }
    }
}

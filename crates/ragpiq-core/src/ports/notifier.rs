//! Outbound notification sent while the shell shuts down.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier reported to the collection endpoint on exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Active camera/session identifier.
    pub session_id: String,
}

impl NotificationPayload {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

/// Why a termination notification was not delivered.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification endpoint is invalid: {0}")]
    InvalidEndpoint(String),

    #[error("notification request failed: {0}")]
    Request(String),

    #[error("notification timed out after {0} ms")]
    TimedOut(u64),
}

/// Delivers the best-effort termination notification.
///
/// Called at most once per process lifetime, by the shutdown coordinator.
#[async_trait]
pub trait ShutdownNotifier: Send + Sync {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError>;
}

/// A notifier that reports success without sending anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl ShutdownNotifier for NoopNotifier {
    async fn notify(&self, _payload: &NotificationPayload) -> Result<(), NotifyError> {
        Ok(())
    }
}

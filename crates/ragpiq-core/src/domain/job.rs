//! Job requests and their outcomes.

use serde::{Deserialize, Serialize};

use super::worker::JobKind;

/// Substring a job worker prints when the USB device is absent.
pub const DEVICE_NOT_FOUND_MARKER: &str = "Device not found";

/// User-facing replacement for [`DEVICE_NOT_FOUND_MARKER`] failures.
pub const PRINTER_NOT_CONNECTED_MESSAGE: &str = "Label printer not connected.";

/// Message used when a failed job printed nothing at all.
pub const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// One discrete request: which job worker to run and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub kind: JobKind,
    /// Opaque positional arguments, passed to the worker unchanged.
    #[serde(default)]
    pub args: Vec<String>,
}

impl JobSpec {
    pub fn new(kind: JobKind, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            kind,
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Label payload as sent by the remote page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRequest {
    pub qr: String,
    pub barcode: String,
    pub created: String,
}

impl From<LabelRequest> for JobSpec {
    fn from(label: LabelRequest) -> Self {
        Self::new(JobKind::Label, [label.qr, label.barcode, label.created])
    }
}

/// Whether a job (or a watcher spawn) succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

/// Result of one job run, always produced, never an exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub outcome: Outcome,
    pub message: String,
}

impl JobOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Error,
            message: message.into(),
        }
    }

    /// Build the outcome of a worker that ran to completion.
    ///
    /// Success carries the trimmed stdout. Failure prefers stderr, then
    /// stdout, then [`UNKNOWN_ERROR_MESSAGE`], and passes the result through
    /// [`translate_failure`].
    pub fn from_exit(success: bool, stdout: &str, stderr: &str) -> Self {
        if success {
            return Self::success(stdout.trim());
        }

        let stderr = stderr.trim();
        let stdout = stdout.trim();
        let raw = if !stderr.is_empty() {
            stderr
        } else if !stdout.is_empty() {
            stdout
        } else {
            UNKNOWN_ERROR_MESSAGE
        };

        Self::error(translate_failure(raw))
    }

    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }
}

/// Map known worker failure text onto user-facing messages.
///
/// Everything that is not recognised passes through verbatim.
pub fn translate_failure(message: &str) -> String {
    if message.contains(DEVICE_NOT_FOUND_MARKER) {
        PRINTER_NOT_CONNECTED_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

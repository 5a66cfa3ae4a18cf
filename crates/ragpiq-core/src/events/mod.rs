//! Status events pushed from the core to the presentation layer.
//!
//! Every event belongs to exactly one [`PushChannel`]. The channel names
//! match the listeners the remote page registers, so keep them stable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{JobOutcome, UnknownKind, WatcherKind};

/// Named push channel from the core to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushChannel {
    #[serde(rename = "printer-status")]
    PrinterStatus,
    #[serde(rename = "label-log")]
    JobResult,
    #[serde(rename = "watcher-log")]
    WatcherLog,
}

impl PushChannel {
    pub const ALL: [Self; 3] = [Self::PrinterStatus, Self::JobResult, Self::WatcherLog];

    pub const fn name(self) -> &'static str {
        match self {
            Self::PrinterStatus => "printer-status",
            Self::JobResult => "label-log",
            Self::WatcherLog => "watcher-log",
        }
    }
}

impl fmt::Display for PushChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PushChannel {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.name() == s.trim())
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Severity of a tagged watcher log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatcherLogLevel {
    Success,
    Error,
}

/// Event delivered to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StatusEvent {
    /// Printer watcher reported the attached printer.
    #[serde(rename_all = "camelCase")]
    PrinterStatus { name: String, setup_required: bool },

    /// A job finished, or a watcher failed to spawn.
    JobResult(JobOutcome),

    /// A tagged progress line from a watcher.
    WatcherLog {
        watcher: WatcherKind,
        level: WatcherLogLevel,
        message: String,
    },
}

impl StatusEvent {
    pub fn printer_status(name: impl Into<String>, setup_required: bool) -> Self {
        Self::PrinterStatus {
            name: name.into(),
            setup_required,
        }
    }

    pub const fn job_result(outcome: JobOutcome) -> Self {
        Self::JobResult(outcome)
    }

    /// The push channel this event is delivered on.
    pub const fn channel(&self) -> PushChannel {
        match self {
            Self::PrinterStatus { .. } => PushChannel::PrinterStatus,
            Self::JobResult(_) => PushChannel::JobResult,
            Self::WatcherLog { .. } => PushChannel::WatcherLog,
        }
    }
}

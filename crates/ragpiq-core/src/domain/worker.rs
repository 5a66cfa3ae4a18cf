//! Worker identities and watcher lifecycle state.
//!
//! A *worker* is an opaque external program. Long-lived workers are
//! *watchers* (one per [`WatcherKind`]); short-lived workers are *jobs*
//! (one process per request, see [`JobKind`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::protocol::LineProtocol;

/// Every external worker program the shell knows how to launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Worker {
    /// Continuously reports the connected label printer.
    PrinterWatcher,
    /// Uploads camera captures dropped into the processing folder.
    CameraWatcher,
    /// Renders and prints one label, then exits.
    LabelPrint,
}

impl Worker {
    /// Script file implementing this worker.
    pub const fn script_file(self) -> &'static str {
        match self {
            Self::PrinterWatcher => "detect_printer.py",
            Self::CameraWatcher => "watcher.py",
            Self::LabelPrint => "label_print.py",
        }
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PrinterWatcher => "printer-watcher",
            Self::CameraWatcher => "camera-watcher",
            Self::LabelPrint => "label-print",
        };
        f.write_str(name)
    }
}

/// Kind of long-lived watcher. At most one process runs per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatcherKind {
    Printer,
    Camera,
}

impl WatcherKind {
    /// All watcher kinds, in teardown order.
    pub const ALL: [Self; 2] = [Self::Printer, Self::Camera];

    pub const fn worker(self) -> Worker {
        match self {
            Self::Printer => Worker::PrinterWatcher,
            Self::Camera => Worker::CameraWatcher,
        }
    }

    /// How this watcher's stdout lines are decoded.
    pub const fn protocol(self) -> LineProtocol {
        match self {
            Self::Printer => LineProtocol::PrinterStatus,
            Self::Camera => LineProtocol::TaggedLog(self),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Printer => "printer",
            Self::Camera => "camera",
        }
    }
}

impl fmt::Display for WatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatcherKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "printer" => Ok(Self::Printer),
            "camera" => Ok(Self::Camera),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Kind of one-shot job worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Label,
}

impl JobKind {
    pub const fn worker(self) -> Worker {
        match self {
            Self::Label => Worker::LabelPrint,
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label => f.write_str("label"),
        }
    }
}

impl FromStr for JobKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "label" | "print-label" => Ok(Self::Label),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// A watcher or job kind string that names nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown worker kind: {0:?}")]
pub struct UnknownKind(pub String);

/// Lifecycle state of one watcher kind.
///
/// One cycle is `Stopped → Starting → Running → Stopping → Stopped`.
/// `Starting → Stopped` happens only when the spawn fails, and
/// `Running → Stopped` only when the process exits on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatcherState {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl WatcherState {
    /// True while a process exists or is being created for this kind.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watcher_kind_parses_case_insensitively() {
        assert_eq!("Printer".parse::<WatcherKind>(), Ok(WatcherKind::Printer));
        assert_eq!(" camera ".parse::<WatcherKind>(), Ok(WatcherKind::Camera));
        assert!("scanner".parse::<WatcherKind>().is_err());
    }

    #[test]
    fn job_kind_accepts_legacy_alias() {
        assert_eq!("print-label".parse::<JobKind>(), Ok(JobKind::Label));
        assert_eq!(JobKind::Label.worker(), Worker::LabelPrint);
    }

    #[test]
    fn each_kind_maps_to_its_script() {
        assert_eq!(WatcherKind::Printer.worker().script_file(), "detect_printer.py");
        assert_eq!(WatcherKind::Camera.worker().script_file(), "watcher.py");
        assert_eq!(JobKind::Label.worker().script_file(), "label_print.py");
    }

    #[test]
    fn watcher_state_serializes_lowercase() {
        let json = serde_json::to_string(&WatcherState::Stopping).unwrap();
        assert_eq!(json, "\"stopping\"");
        assert!(!WatcherState::default().is_active());
        assert!(WatcherState::Starting.is_active());
    }
}

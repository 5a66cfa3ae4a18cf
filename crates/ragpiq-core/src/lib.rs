//! Core domain types, worker line protocol and port definitions for Ragpiq Link.
//!
//! This crate has no process, HTTP or UI dependencies. The runtime crate
//! builds supervision on top of it and the desktop host wires it to Tauri.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod events;
pub mod paths;
pub mod ports;
pub mod protocol;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    JobKind, JobOutcome, JobSpec, LabelRequest, Outcome, UnknownKind, WatcherKind, WatcherState,
    Worker,
};
pub use error::WorkerError;
pub use events::{PushChannel, StatusEvent, WatcherLogLevel};
pub use paths::{BuildMode, InstallLayout, LaunchSpec, PathError, Platform, WorkerLocator};
pub use ports::{
    EventListener, FnListener, NoopListener, NoopNotifier, NotificationPayload, NotifyError,
    ShutdownNotifier, WorkerResolver,
};
pub use protocol::{LineProtocol, ParsedLine, Unparseable, parse_line};
pub use settings::{SettingsError, ShellConfig};

// Silence unused dev-dependency warnings; used by the integration tests
#[cfg(test)]
use tempfile as _;

//! Worker process supervision and shutdown coordination.
//!
//! - [`supervisor`] - one long-lived watcher per kind, start/stop state machine
//! - [`jobs`] - one-shot job workers run to completion
//! - [`bridge`] - commands in, typed events out
//! - [`lifecycle`] - ordered, exactly-once application shutdown
//! - [`bootstrap`] - the composition root hosts build on

#![deny(unused_crate_dependencies)]

pub mod bootstrap;
pub mod bridge;
pub mod jobs;
pub mod lifecycle;
pub mod notify;
pub mod process;
pub mod signals;
pub mod supervisor;

pub use bootstrap::{RuntimeContext, RuntimeTimings, bootstrap};
pub use bridge::{BridgeError, PushChannels, StatusBridge};
pub use jobs::JobRunner;
pub use lifecycle::{
    ShutdownCoordinator, ShutdownOutcome, ShutdownPhase, ShutdownPlan, ShutdownTrigger,
};
pub use notify::HttpNotifier;
pub use signals::wait_for_termination_signal;
pub use supervisor::{StartError, StartStatus, StopStatus, WatcherRegistry, WatcherSupervisor};

// Integration-test-only dev-dependencies
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tempfile as _;

//! Long-lived watcher supervision.
//!
//! - `WatcherSupervisor` - start/stop state machine for one watcher kind
//! - `WatcherRegistry` - the set of supervisors, one per kind

mod registry;
mod watcher;

pub use registry::WatcherRegistry;
pub use watcher::{
    StartError, StartStatus, StopCompletion, StopRequest, StopStatus, WatcherSupervisor,
};

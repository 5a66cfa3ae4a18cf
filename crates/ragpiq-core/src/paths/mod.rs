//! Path utilities: worker location, install layout and data directories.
//!
//! # Design
//!
//! - Worker resolution is pure and returns paths that may not exist
//! - Spawn-time existence checks belong to the runtime
//! - OS-specific choices are keyed on [`Platform`] so they can be tested on any host

mod error;
mod locator;
mod platform;

pub use error::PathError;
pub use locator::{InstallLayout, LaunchSpec, WorkerLocator};
pub use platform::{BuildMode, Platform, data_root};

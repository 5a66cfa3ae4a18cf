//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No process or HTTP client types in any signature
//! - Listeners are fire-and-forget: they never return errors to the core
//! - Resolution is synchronous and infallible; spawning reports failures

mod listener;
mod notifier;

pub use listener::{EventListener, FnListener, NoopListener};
pub use notifier::{NoopNotifier, NotificationPayload, NotifyError, ShutdownNotifier};

use crate::domain::Worker;
use crate::paths::LaunchSpec;

/// Resolves a worker and its arguments into a concrete launch.
///
/// Implemented by [`crate::paths::WorkerLocator`] in the shell; tests supply
/// their own resolvers to launch stand-in programs.
pub trait WorkerResolver: Send + Sync {
    fn resolve(&self, worker: Worker, args: &[String]) -> LaunchSpec;
}

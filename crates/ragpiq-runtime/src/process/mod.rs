//! Worker process infrastructure.
//!
//! # Structure
//!
//! - `ProcessHandle` - one spawned worker with streamed or captured output
//! - `ExitWatch` - cloneable completion signal for a handle
//! - `terminate_child` - SIGTERM → grace → SIGKILL escalation
//!
//! Readers decode output lossily so a single bad byte never ends a stream.

mod handle;
pub mod shutdown;
mod stream;
mod types;

pub use handle::{ExitWatch, ProcessHandle};
pub use shutdown::terminate_child;
pub use types::{CapturedOutput, ExitReport, OutputLine, OutputMode, StreamKind};

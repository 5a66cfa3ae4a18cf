//! Domain types shared by every adapter.

mod job;
mod worker;

pub use job::{
    DEVICE_NOT_FOUND_MARKER, JobOutcome, JobSpec, LabelRequest, Outcome,
    PRINTER_NOT_CONNECTED_MESSAGE, UNKNOWN_ERROR_MESSAGE, translate_failure,
};
pub use worker::{JobKind, UnknownKind, WatcherKind, WatcherState, Worker};

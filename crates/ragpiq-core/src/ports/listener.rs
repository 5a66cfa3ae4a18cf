//! Listener trait for push-channel delivery.
//!
//! The presentation adapter (Tauri IPC channel, test recorder, ...) implements
//! this trait and registers it on a push channel.

use std::fmt;

use crate::events::StatusEvent;

/// Receives events delivered on one push channel.
///
/// Implementations must not block; they should hand the event to their
/// transport and return.
pub trait EventListener: Send + Sync {
    fn deliver(&self, event: &StatusEvent);
}

/// Listener backed by a closure.
pub struct FnListener<F>(F);

impl<F> FnListener<F>
where
    F: Fn(&StatusEvent) + Send + Sync,
{
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&StatusEvent) + Send + Sync,
{
    fn deliver(&self, event: &StatusEvent) {
        (self.0)(event);
    }
}

impl<F> fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener").finish_non_exhaustive()
    }
}

/// A listener that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl EventListener for NoopListener {
    fn deliver(&self, _event: &StatusEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn fn_listener_forwards_events() {
        let seen = Mutex::new(Vec::new());
        let listener = FnListener::new(|event: &StatusEvent| {
            seen.lock().unwrap().push(event.clone());
        });

        listener.deliver(&StatusEvent::printer_status("QL-700", false));

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[StatusEvent::printer_status("QL-700", false)]
        );
    }

    #[test]
    fn noop_listener_accepts_anything() {
        NoopListener.deliver(&StatusEvent::printer_status("", true));
    }
}

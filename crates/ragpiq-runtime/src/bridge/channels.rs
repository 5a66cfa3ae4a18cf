//! Push channels towards the presentation layer.
//!
//! Each channel holds at most one listener. Subscribing again replaces the
//! previous listener, so a reloaded page never receives duplicate events.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ragpiq_core::{EventListener, PushChannel, StatusEvent};
use tracing::{debug, trace};

/// Listener registry keyed by channel.
#[derive(Default)]
pub struct PushChannels {
    listeners: RwLock<HashMap<PushChannel, Arc<dyn EventListener>>>,
}

impl PushChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `listener` on `channel`, returning whether one was replaced.
    pub fn subscribe(&self, channel: PushChannel, listener: Arc<dyn EventListener>) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let replaced = listeners.insert(channel, listener).is_some();
        debug!(%channel, replaced, "Listener subscribed");
        replaced
    }

    pub fn unsubscribe(&self, channel: PushChannel) -> bool {
        self.listeners
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&channel)
            .is_some()
    }

    pub fn has_listener(&self, channel: PushChannel) -> bool {
        self.listeners
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(&channel)
    }

    /// Deliver `event` to the listener of its channel, if any.
    pub fn emit(&self, event: &StatusEvent) {
        let channel = event.channel();
        // Clone out of the lock so a listener may resubscribe while handling.
        let listener = self
            .listeners
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&channel)
            .cloned();

        match listener {
            Some(listener) => listener.deliver(event),
            None => trace!(%channel, "No listener; event dropped"),
        }
    }
}

impl std::fmt::Debug for PushChannels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribed: Vec<PushChannel> = PushChannel::ALL
            .into_iter()
            .filter(|channel| self.has_listener(*channel))
            .collect();
        f.debug_struct("PushChannels")
            .field("subscribed", &subscribed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragpiq_core::{FnListener, JobOutcome};
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<StatusEvent>>>, Arc<dyn EventListener>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener = FnListener::new(move |event: &StatusEvent| {
            sink.lock().unwrap().push(event.clone());
        });
        (seen, Arc::new(listener))
    }

    #[test]
    fn events_reach_only_their_channel() {
        let channels = PushChannels::new();
        let (status, status_listener) = recorder();
        let (jobs, job_listener) = recorder();
        channels.subscribe(PushChannel::PrinterStatus, status_listener);
        channels.subscribe(PushChannel::JobResult, job_listener);

        channels.emit(&StatusEvent::printer_status("Zebra ZT230", false));

        assert_eq!(status.lock().unwrap().len(), 1);
        assert!(jobs.lock().unwrap().is_empty());
    }

    #[test]
    fn resubscribing_replaces_the_listener() {
        let channels = PushChannels::new();
        let (first, first_listener) = recorder();
        let (second, second_listener) = recorder();

        assert!(!channels.subscribe(PushChannel::JobResult, first_listener));
        assert!(channels.subscribe(PushChannel::JobResult, second_listener));

        channels.emit(&StatusEvent::job_result(JobOutcome::success("OK")));

        assert!(first.lock().unwrap().is_empty());
        assert_eq!(second.lock().unwrap().len(), 1);
    }

    #[test]
    fn emit_without_listener_is_silent() {
        let channels = PushChannels::new();
        channels.emit(&StatusEvent::printer_status("", true));
        assert!(!channels.has_listener(PushChannel::PrinterStatus));
    }

    #[test]
    fn unsubscribe_removes_the_listener() {
        let channels = PushChannels::new();
        let (seen, listener) = recorder();
        channels.subscribe(PushChannel::PrinterStatus, listener);

        assert!(channels.unsubscribe(PushChannel::PrinterStatus));
        assert!(!channels.unsubscribe(PushChannel::PrinterStatus));
        channels.emit(&StatusEvent::printer_status("x", false));
        assert!(seen.lock().unwrap().is_empty());
    }
}

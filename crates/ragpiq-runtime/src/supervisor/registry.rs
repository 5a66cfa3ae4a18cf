//! One supervisor per watcher kind.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use ragpiq_core::{WatcherKind, WatcherState, WorkerResolver};

use super::watcher::{StopStatus, WatcherSupervisor};
use crate::bridge::PushChannels;

#[derive(Debug, Clone)]
pub struct WatcherRegistry {
    printer: WatcherSupervisor,
    camera: WatcherSupervisor,
}

impl WatcherRegistry {
    pub fn new(
        resolver: Arc<dyn WorkerResolver>,
        channels: Arc<PushChannels>,
        grace: Duration,
    ) -> Self {
        let supervisor = |kind| {
            WatcherSupervisor::new(kind, Arc::clone(&resolver), Arc::clone(&channels), grace)
        };
        Self {
            printer: supervisor(WatcherKind::Printer),
            camera: supervisor(WatcherKind::Camera),
        }
    }

    pub const fn get(&self, kind: WatcherKind) -> &WatcherSupervisor {
        match kind {
            WatcherKind::Printer => &self.printer,
            WatcherKind::Camera => &self.camera,
        }
    }

    /// Supervisors in [`WatcherKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &WatcherSupervisor> {
        WatcherKind::ALL.into_iter().map(|kind| self.get(kind))
    }

    pub fn states(&self) -> Vec<(WatcherKind, WatcherState)> {
        self.iter()
            .map(|supervisor| (supervisor.kind(), supervisor.state()))
            .collect()
    }

    /// Refuse new starts on every watcher.
    pub fn close(&self) {
        for supervisor in self.iter() {
            supervisor.close();
        }
    }

    /// Stop every watcher concurrently and wait for all of them to exit.
    ///
    /// Each supervisor is asked under its slot lock, so a start that is
    /// mid-spawn is stopped rather than skipped. Only watchers that were
    /// actually stopped are reported.
    pub async fn stop_active(&self) -> Vec<(WatcherKind, StopStatus)> {
        join_all(
            self.iter()
                .map(|supervisor| async move { (supervisor.kind(), supervisor.stop().await) }),
        )
        .await
        .into_iter()
        .filter(|(_, status)| *status == StopStatus::Stopped)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragpiq_core::{LaunchSpec, Worker};

    struct NeverResolves;

    impl WorkerResolver for NeverResolves {
        fn resolve(&self, _worker: Worker, _args: &[String]) -> LaunchSpec {
            LaunchSpec::new("/nonexistent/worker")
        }
    }

    fn registry() -> WatcherRegistry {
        WatcherRegistry::new(
            Arc::new(NeverResolves),
            Arc::new(PushChannels::new()),
            Duration::from_millis(100),
        )
    }

    #[test]
    fn every_kind_has_a_supervisor() {
        let registry = registry();
        for kind in WatcherKind::ALL {
            assert_eq!(registry.get(kind).kind(), kind);
        }
        assert!(
            registry
                .states()
                .iter()
                .all(|(_, state)| *state == WatcherState::Stopped)
        );
    }

    #[tokio::test]
    async fn stop_active_skips_stopped_watchers() {
        assert!(registry().stop_active().await.is_empty());
    }

    #[test]
    fn close_reaches_every_supervisor() {
        let registry = registry();
        registry.close();
        assert!(registry.iter().all(WatcherSupervisor::is_closed));
    }
}

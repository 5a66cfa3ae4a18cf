//! Command and event surface between the presentation layer and workers.
//!
//! Commands go in through [`StatusBridge`]; events come back out through
//! [`PushChannels`], one listener per channel.

mod channels;

use std::sync::Arc;

use ragpiq_core::{
    EventListener, JobOutcome, JobSpec, LabelRequest, NotificationPayload, PushChannel,
    StatusEvent, UnknownKind, WatcherKind, WorkerError,
};
use thiserror::Error;
use tracing::{debug, info};

pub use channels::PushChannels;

use crate::jobs::JobRunner;
use crate::lifecycle::{ShutdownCoordinator, ShutdownOutcome, ShutdownTrigger};
use crate::supervisor::{StartError, StartStatus, StopStatus, WatcherRegistry};

/// Errors returned to command callers.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error("application is shutting down")]
    ShuttingDown,
}

impl From<StartError> for BridgeError {
    fn from(err: StartError) -> Self {
        match err {
            StartError::Worker(err) => Self::Worker(err),
            StartError::Closed(_) => Self::ShuttingDown,
        }
    }
}

#[derive(Clone)]
pub struct StatusBridge {
    registry: WatcherRegistry,
    jobs: JobRunner,
    channels: Arc<PushChannels>,
    coordinator: Arc<ShutdownCoordinator>,
}

impl StatusBridge {
    pub const fn new(
        registry: WatcherRegistry,
        jobs: JobRunner,
        channels: Arc<PushChannels>,
        coordinator: Arc<ShutdownCoordinator>,
    ) -> Self {
        Self {
            registry,
            jobs,
            channels,
            coordinator,
        }
    }

    /// Start a watcher. When a camera watcher is launched, its first
    /// argument is remembered as the identifier to report on exit.
    pub async fn start_watcher(
        &self,
        kind: WatcherKind,
        args: &[String],
    ) -> Result<StartStatus, BridgeError> {
        if self.coordinator.is_quitting() {
            return Err(BridgeError::ShuttingDown);
        }

        let status = self.registry.get(kind).start(args).await?;

        if kind == WatcherKind::Camera && status == StartStatus::Started {
            if let Some(camera_id) = args.first().filter(|id| !id.trim().is_empty()) {
                self.coordinator
                    .set_pending_notification(NotificationPayload::new(camera_id.trim()));
            }
        }
        Ok(status)
    }

    pub async fn stop_watcher(&self, kind: WatcherKind) -> StopStatus {
        self.registry.get(kind).stop().await
    }

    /// Run a job; the outcome is returned and also pushed on `label-log`.
    pub async fn run_job(&self, job: &JobSpec) -> JobOutcome {
        let outcome = self.jobs.run(job).await;
        self.channels.emit(&StatusEvent::job_result(outcome.clone()));
        outcome
    }

    pub async fn print_label(&self, label: LabelRequest) -> JobOutcome {
        debug!(qr = %label.qr, barcode = %label.barcode, "Printing label");
        self.run_job(&label.into()).await
    }

    /// The page asked the app to quit.
    pub async fn request_exit(&self) -> ShutdownOutcome {
        info!("Exit requested by the page");
        self.coordinator
            .shutdown(ShutdownTrigger::PresentationRequest)
            .await
    }

    /// Install the sole listener for `channel`.
    pub fn subscribe(&self, channel: PushChannel, listener: Arc<dyn EventListener>) -> bool {
        self.channels.subscribe(channel, listener)
    }

    pub const fn registry(&self) -> &WatcherRegistry {
        &self.registry
    }

    pub const fn coordinator(&self) -> &Arc<ShutdownCoordinator> {
        &self.coordinator
    }
}

impl std::fmt::Debug for StatusBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusBridge")
            .field("registry", &self.registry)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

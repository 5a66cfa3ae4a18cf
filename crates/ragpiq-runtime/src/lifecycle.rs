//! Application shutdown sequencing.
//!
//! The first trigger moves the phase from `Idle` to `Quitting` with a single
//! compare-and-set; every later trigger observes `AlreadyInProgress`. The
//! winner closes the watcher registry, stops live watchers, sends the
//! pending notification and finally publishes `Exited`, after which the host
//! may terminate. Closing first means no watcher can be launched between the
//! stop and the exit.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use ragpiq_core::{NotificationPayload, NotifyError, ShutdownNotifier, WorkerError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::supervisor::WatcherRegistry;

/// What asked the application to quit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    /// The page asked to quit (`app_exit`).
    PresentationRequest,
    /// The last window was closed.
    LastWindowClosed,
    /// The OS or window system asked the app to quit.
    AppExitRequested,
    /// SIGINT/SIGTERM/SIGQUIT or Ctrl-C.
    OsSignal,
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PresentationRequest => "presentation-request",
            Self::LastWindowClosed => "last-window-closed",
            Self::AppExitRequested => "app-exit-requested",
            Self::OsSignal => "os-signal",
        };
        f.write_str(name)
    }
}

/// Which shutdown steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownPlan {
    pub stop_watchers: bool,
    pub notify: bool,
}

impl ShutdownPlan {
    pub const FULL: Self = Self {
        stop_watchers: true,
        notify: true,
    };

    pub const STOP_ONLY: Self = Self {
        stop_watchers: true,
        notify: false,
    };
}

impl Default for ShutdownPlan {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShutdownPhase {
    Idle = 0,
    Quitting = 1,
    Exited = 2,
}

impl ShutdownPhase {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Quitting,
            _ => Self::Exited,
        }
    }
}

/// Result of [`ShutdownCoordinator::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// This caller ran the sequence to the end.
    Completed,
    /// Another trigger got there first.
    AlreadyInProgress,
}

pub struct ShutdownCoordinator {
    phase: AtomicU8,
    phase_tx: watch::Sender<ShutdownPhase>,
    pending: Mutex<Option<NotificationPayload>>,
    plan: ShutdownPlan,
    registry: WatcherRegistry,
    notifier: Arc<dyn ShutdownNotifier>,
    notify_timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(
        registry: WatcherRegistry,
        notifier: Arc<dyn ShutdownNotifier>,
        plan: ShutdownPlan,
        notify_timeout: Duration,
    ) -> Self {
        let (phase_tx, _) = watch::channel(ShutdownPhase::Idle);
        Self {
            phase: AtomicU8::new(ShutdownPhase::Idle as u8),
            phase_tx,
            pending: Mutex::new(None),
            plan,
            registry,
            notifier,
            notify_timeout,
        }
    }

    pub fn phase(&self) -> ShutdownPhase {
        ShutdownPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn is_quitting(&self) -> bool {
        self.phase() != ShutdownPhase::Idle
    }

    pub const fn plan(&self) -> ShutdownPlan {
        self.plan
    }

    /// Remember the identifier to report when the app terminates.
    pub fn set_pending_notification(&self, payload: NotificationPayload) {
        debug!(session_id = %payload.session_id, "Pending shutdown notification recorded");
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload);
    }

    pub fn pending_notification(&self) -> Option<NotificationPayload> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run the shutdown sequence if no other trigger has started it.
    ///
    /// Never fails: stop and notification problems are logged and the
    /// sequence continues to `Exited`.
    pub async fn shutdown(&self, trigger: ShutdownTrigger) -> ShutdownOutcome {
        if self
            .phase
            .compare_exchange(
                ShutdownPhase::Idle as u8,
                ShutdownPhase::Quitting as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            debug!(%trigger, phase = ?self.phase(), "Shutdown already in progress");
            return ShutdownOutcome::AlreadyInProgress;
        }
        self.phase_tx.send_replace(ShutdownPhase::Quitting);
        info!(%trigger, plan = ?self.plan, "Shutdown started");
        self.registry.close();

        if self.plan.stop_watchers {
            for (kind, status) in self.registry.stop_active().await {
                info!(%kind, ?status, "Watcher stopped for shutdown");
            }
        }

        if self.plan.notify {
            match self.pending_notification() {
                Some(payload) => self.send_notification(&payload).await,
                None => debug!("No pending shutdown notification"),
            }
        }

        self.phase
            .store(ShutdownPhase::Exited as u8, Ordering::Release);
        self.phase_tx.send_replace(ShutdownPhase::Exited);
        info!(%trigger, "Shutdown complete");
        ShutdownOutcome::Completed
    }

    /// Resolve once some caller has completed the shutdown sequence.
    pub async fn wait_exited(&self) {
        let mut phase = self.phase_tx.subscribe();
        // The sender lives in `self`, so this only ends at `Exited`.
        let _ = phase
            .wait_for(|phase| *phase == ShutdownPhase::Exited)
            .await;
    }

    async fn send_notification(&self, payload: &NotificationPayload) {
        let result = tokio::time::timeout(self.notify_timeout, self.notifier.notify(payload))
            .await
            .unwrap_or_else(|_| {
                Err(NotifyError::TimedOut(
                    u64::try_from(self.notify_timeout.as_millis()).unwrap_or(u64::MAX),
                ))
            });

        match result {
            Ok(()) => info!(session_id = %payload.session_id, "Shutdown notification sent"),
            Err(e) => {
                let failure = WorkerError::NotificationFailure(e.to_string());
                warn!(session_id = %payload.session_id, error = %failure, "Continuing shutdown");
            }
        }
    }
}

impl fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("phase", &self.phase())
            .field("plan", &self.plan)
            .field("notify_timeout", &self.notify_timeout)
            .finish_non_exhaustive()
    }
}

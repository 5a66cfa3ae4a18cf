//! Supervisor for one long-lived watcher kind.
//!
//! The slot mutex is held across resolve and spawn, so two overlapping
//! `start` calls can never launch two processes for the same kind. It is
//! never held while waiting for a process to exit: exit is observed by a
//! monitor task that re-acquires the slot only to record the transition.
//!
//! Once [`WatcherSupervisor::close`] has been called, no new process is
//! launched. The flag is checked under the slot lock, so a start queued
//! behind a pending stop cannot slip past a shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ragpiq_core::{
    JobOutcome, ParsedLine, StatusEvent, Unparseable, WatcherKind, WatcherState, WorkerError,
    WorkerResolver, parse_line,
};
use thiserror::Error;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info, warn};

use crate::bridge::PushChannels;
use crate::process::{ExitWatch, OutputLine, OutputMode, ProcessHandle, StreamKind};

/// Result of [`WatcherSupervisor::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    Started,
    AlreadyRunning,
}

impl StartStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::AlreadyRunning => "already running",
        }
    }
}

/// Why [`WatcherSupervisor::start`] did not launch a process.
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error("{0} watcher is closed")]
    Closed(WatcherKind),
}

/// Result of [`WatcherSupervisor::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopStatus {
    Stopped,
    NotRunning,
}

impl StopStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::NotRunning => "not running",
        }
    }
}

/// Result of [`WatcherSupervisor::request_stop`].
#[derive(Debug)]
pub enum StopRequest {
    NotRunning,
    Pending(StopCompletion),
}

/// Resolves once the stopped process has exited and its handle is released.
#[derive(Debug)]
pub struct StopCompletion {
    released: watch::Receiver<u64>,
    generation: u64,
}

impl StopCompletion {
    pub async fn wait(mut self) {
        let generation = self.generation;
        // A dropped sender means the supervisor is gone along with the process.
        let _ = self
            .released
            .wait_for(move |released| *released >= generation)
            .await;
    }
}

struct Slot {
    state: WatcherState,
    handle: Option<ProcessHandle>,
    /// Incremented on every successful spawn.
    generation: u64,
}

struct Inner {
    kind: WatcherKind,
    resolver: Arc<dyn WorkerResolver>,
    channels: Arc<PushChannels>,
    grace: Duration,
    slot: Mutex<Slot>,
    closed: AtomicBool,
    state_tx: watch::Sender<WatcherState>,
    /// Highest generation whose process has exited and been released.
    released_tx: watch::Sender<u64>,
}

impl Inner {
    fn set_state(&self, slot: &mut Slot, state: WatcherState) {
        debug!(kind = %self.kind, from = ?slot.state, to = ?state, "Watcher state change");
        slot.state = state;
        self.state_tx.send_replace(state);
    }
}

/// Owns the single process slot of one [`WatcherKind`].
#[derive(Clone)]
pub struct WatcherSupervisor {
    inner: Arc<Inner>,
}

impl WatcherSupervisor {
    pub fn new(
        kind: WatcherKind,
        resolver: Arc<dyn WorkerResolver>,
        channels: Arc<PushChannels>,
        grace: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(WatcherState::Stopped);
        let (released_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                kind,
                resolver,
                channels,
                grace,
                slot: Mutex::new(Slot {
                    state: WatcherState::Stopped,
                    handle: None,
                    generation: 0,
                }),
                closed: AtomicBool::new(false),
                state_tx,
                released_tx,
            }),
        }
    }

    pub fn kind(&self) -> WatcherKind {
        self.inner.kind
    }

    /// Current state, without waiting for in-flight transitions.
    pub fn state(&self) -> WatcherState {
        *self.inner.state_tx.borrow()
    }

    /// Observe state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<WatcherState> {
        self.inner.state_tx.subscribe()
    }

    /// Refuse every later start. A running process is left alone.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Pid of the live process, if any.
    pub async fn pid(&self) -> Option<u32> {
        self.inner
            .slot
            .lock()
            .await
            .handle
            .as_ref()
            .and_then(ProcessHandle::pid)
    }

    /// Start the watcher unless one is already live.
    ///
    /// A start that arrives while the previous process is still stopping
    /// waits for it to exit, then launches a fresh one unless the
    /// supervisor was closed in the meantime.
    pub async fn start(&self, args: &[String]) -> Result<StartStatus, StartError> {
        let inner = &self.inner;
        let worker = inner.kind.worker();

        loop {
            let mut slot = inner.slot.lock().await;
            if self.is_closed() {
                debug!(kind = %inner.kind, state = ?slot.state, "Start refused, watcher closed");
                return Err(StartError::Closed(inner.kind));
            }
            match slot.state {
                WatcherState::Running | WatcherState::Starting => {
                    debug!(kind = %inner.kind, "Watcher already running");
                    return Ok(StartStatus::AlreadyRunning);
                }
                WatcherState::Stopping => {
                    let pending = self.completion(slot.generation);
                    drop(slot);
                    debug!(kind = %inner.kind, "Start queued behind pending stop");
                    pending.wait().await;
                    continue;
                }
                WatcherState::Stopped => {}
            }

            inner.set_state(&mut slot, WatcherState::Starting);
            let spec = inner.resolver.resolve(worker, args);

            let mut handle = match ProcessHandle::spawn(&spec, OutputMode::Streamed, inner.grace) {
                Ok(handle) => handle,
                Err(e) => {
                    inner.set_state(&mut slot, WatcherState::Stopped);
                    drop(slot);

                    let err = WorkerError::spawn(worker, &e);
                    warn!(kind = %inner.kind, command = %spec.display_command(), error = %err, "Watcher failed to start");
                    inner.channels.emit(&StatusEvent::job_result(JobOutcome::error(format!(
                        "Failed to start {} watcher: {e}",
                        inner.kind
                    ))));
                    return Err(err.into());
                }
            };

            slot.generation += 1;
            let generation = slot.generation;

            if let Some(lines) = handle.take_lines() {
                tokio::spawn(pump_lines(inner.kind, Arc::clone(&inner.channels), lines));
            }
            tokio::spawn(monitor_exit(
                Arc::clone(inner),
                generation,
                handle.exit_watch(),
            ));

            info!(kind = %inner.kind, pid = ?handle.pid(), command = %handle.command(), "Watcher started");
            slot.handle = Some(handle);
            inner.set_state(&mut slot, WatcherState::Running);
            return Ok(StartStatus::Started);
        }
    }

    /// Send termination and return without waiting for the exit.
    pub async fn request_stop(&self) -> StopRequest {
        let inner = &self.inner;
        let mut slot = inner.slot.lock().await;

        match slot.state {
            WatcherState::Stopped => StopRequest::NotRunning,
            WatcherState::Stopping => StopRequest::Pending(self.completion(slot.generation)),
            WatcherState::Running | WatcherState::Starting => {
                inner.set_state(&mut slot, WatcherState::Stopping);
                if let Some(handle) = slot.handle.as_mut() {
                    info!(kind = %inner.kind, pid = ?handle.pid(), "Stopping watcher");
                    handle.terminate();
                }
                StopRequest::Pending(self.completion(slot.generation))
            }
        }
    }

    /// Stop the watcher and wait until its process has exited.
    pub async fn stop(&self) -> StopStatus {
        match self.request_stop().await {
            StopRequest::NotRunning => StopStatus::NotRunning,
            StopRequest::Pending(completion) => {
                completion.wait().await;
                StopStatus::Stopped
            }
        }
    }

    fn completion(&self, generation: u64) -> StopCompletion {
        StopCompletion {
            released: self.inner.released_tx.subscribe(),
            generation,
        }
    }
}

impl std::fmt::Debug for WatcherSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherSupervisor")
            .field("kind", &self.inner.kind)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

async fn pump_lines(
    kind: WatcherKind,
    channels: Arc<PushChannels>,
    mut lines: mpsc::UnboundedReceiver<OutputLine>,
) {
    let protocol = kind.protocol();

    while let Some(line) = lines.recv().await {
        match line.stream {
            StreamKind::Stdout => match parse_line(protocol, &line.text) {
                ParsedLine::Event(event) => channels.emit(&event),
                ParsedLine::Unparseable(Unparseable::Blank) => {}
                ParsedLine::Unparseable(reason) => {
                    let violation = WorkerError::ProtocolViolation {
                        worker: kind.worker(),
                        reason: reason.to_string(),
                        line: line.text,
                    };
                    debug!(%kind, error = %violation, "Dropping watcher line");
                }
            },
            StreamKind::Stderr => warn!(%kind, stream = "stderr", "{}", line.text),
        }
    }

    debug!(%kind, "Watcher output closed");
}

async fn monitor_exit(inner: Arc<Inner>, generation: u64, exit: ExitWatch) {
    let report = exit.wait().await;

    let mut slot = inner.slot.lock().await;
    if slot.generation != generation {
        return;
    }

    match slot.state {
        WatcherState::Stopping => info!(kind = %inner.kind, %report, "Watcher stopped"),
        WatcherState::Running => {
            let failure = WorkerError::WorkerFailure {
                worker: inner.kind.worker(),
                message: format!("exited unexpectedly ({report})"),
            };
            warn!(kind = %inner.kind, error = %failure, "Watcher exited on its own; not restarting");
        }
        WatcherState::Starting | WatcherState::Stopped => {}
    }

    slot.handle = None;
    inner.set_state(&mut slot, WatcherState::Stopped);
    inner.released_tx.send_replace(generation);
}

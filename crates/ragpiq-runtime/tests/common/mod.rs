//! Shared fixtures: shell-script workers, a recording listener and a fake
//! notifier.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use ragpiq_core::{
    EventListener, LaunchSpec, NotificationPayload, NotifyError, ShutdownNotifier, StatusEvent,
    WatcherState, Worker, WorkerResolver,
};
use ragpiq_runtime::{RuntimeContext, RuntimeTimings, ShutdownPlan, WatcherSupervisor};

pub const PRINTER_LINE: &str = r#"{"printer_name": "Zebra ZT230", "setup_required": false}"#;

pub const TIMINGS: RuntimeTimings = RuntimeTimings {
    stop_grace: Duration::from_secs(2),
    notify_timeout: Duration::from_millis(500),
};

/// Runs each worker as `/bin/sh -c <script> <worker> <args...>`.
///
/// Job arguments are available to the script as `$1`, `$2`, ...
#[derive(Default)]
pub struct ScriptResolver {
    scripts: HashMap<Worker, String>,
    resolved: AtomicUsize,
}

impl ScriptResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, worker: Worker, script: impl Into<String>) -> Self {
        self.scripts.insert(worker, script.into());
        self
    }

    /// Number of launch specs handed out so far.
    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }
}

impl WorkerResolver for ScriptResolver {
    fn resolve(&self, worker: Worker, args: &[String]) -> LaunchSpec {
        self.resolved.fetch_add(1, Ordering::SeqCst);
        match self.scripts.get(&worker) {
            Some(script) => LaunchSpec::new("/bin/sh")
                .arg("-c")
                .arg(script)
                .arg(worker.to_string())
                .args(args),
            None => LaunchSpec::new(format!("/nonexistent/{}", worker.script_file())),
        }
    }
}

/// Collects every event delivered to it.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<StatusEvent>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Poll until at least `count` events arrived or five seconds passed.
    pub async fn wait_for(&self, count: usize) -> Vec<StatusEvent> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let events = self.events();
            if events.len() >= count || tokio::time::Instant::now() >= deadline {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

impl EventListener for RecordingListener {
    fn deliver(&self, event: &StatusEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// How the fake notifier answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Accept,
    Fail,
    Hang,
}

/// Records each notification together with the watcher state seen at
/// that moment.
pub struct FakeNotifier {
    reply: Reply,
    calls: Mutex<Vec<(NotificationPayload, Vec<WatcherState>)>>,
    watched: OnceLock<Vec<WatcherSupervisor>>,
}

impl FakeNotifier {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
            watched: OnceLock::new(),
        })
    }

    /// Watchers whose state is captured on every call.
    pub fn watch(&self, ctx: &RuntimeContext) {
        let supervisors = ctx.bridge.registry().iter().cloned().collect();
        let _ = self.watched.set(supervisors);
    }

    pub fn calls(&self) -> Vec<(NotificationPayload, Vec<WatcherState>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShutdownNotifier for FakeNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let states = self
            .watched
            .get()
            .map(|watched| watched.iter().map(WatcherSupervisor::state).collect())
            .unwrap_or_default();
        self.calls.lock().unwrap().push((payload.clone(), states));

        match self.reply {
            Reply::Accept => Ok(()),
            Reply::Fail => Err(NotifyError::Request("connection refused".into())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
        }
    }
}

/// Runtime over `resolver` with a notifier that accepts everything.
pub fn runtime(resolver: Arc<ScriptResolver>) -> RuntimeContext {
    RuntimeContext::from_parts(
        resolver,
        FakeNotifier::new(Reply::Accept),
        ShutdownPlan::FULL,
        TIMINGS,
    )
}

pub fn runtime_with_notifier(
    resolver: Arc<ScriptResolver>,
    notifier: Arc<FakeNotifier>,
) -> RuntimeContext {
    let ctx = RuntimeContext::from_parts(resolver, notifier.clone(), ShutdownPlan::FULL, TIMINGS);
    notifier.watch(&ctx);
    ctx
}

//! Shutdown sequencing with live watchers.
#![cfg(unix)]

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{FakeNotifier, Reply, ScriptResolver, runtime_with_notifier};
use ragpiq_core::{WatcherKind, WatcherState, Worker};
use ragpiq_runtime::{
    BridgeError, RuntimeContext, ShutdownOutcome, ShutdownPhase, ShutdownTrigger,
};

fn live_runtime(reply: Reply) -> (RuntimeContext, Arc<FakeNotifier>) {
    let resolver = Arc::new(
        ScriptResolver::new()
            .with(Worker::PrinterWatcher, "exec sleep 30")
            .with(Worker::CameraWatcher, "exec sleep 30"),
    );
    let notifier = FakeNotifier::new(reply);
    let ctx = runtime_with_notifier(resolver, notifier.clone());
    (ctx, notifier)
}

async fn start_both(ctx: &RuntimeContext) {
    ctx.bridge
        .start_watcher(WatcherKind::Printer, &[])
        .await
        .unwrap();
    ctx.bridge
        .start_watcher(WatcherKind::Camera, &["cam-9".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn watchers_are_stopped_before_notification() {
    let (ctx, notifier) = live_runtime(Reply::Accept);
    start_both(&ctx).await;

    let outcome = ctx.bridge.request_exit().await;

    assert_eq!(outcome, ShutdownOutcome::Completed);
    assert_eq!(ctx.coordinator.phase(), ShutdownPhase::Exited);

    let calls = notifier.calls();
    assert_eq!(calls.len(), 1);
    let (payload, states_at_notify) = &calls[0];
    assert_eq!(payload.session_id, "cam-9");
    assert!(
        states_at_notify
            .iter()
            .all(|state| *state == WatcherState::Stopped),
        "{states_at_notify:?}"
    );
}

#[tokio::test]
async fn concurrent_triggers_run_the_sequence_once() {
    let (ctx, notifier) = live_runtime(Reply::Accept);
    start_both(&ctx).await;

    let coordinator = ctx.coordinator.clone();
    let (a, b) = tokio::join!(
        coordinator.shutdown(ShutdownTrigger::LastWindowClosed),
        coordinator.shutdown(ShutdownTrigger::OsSignal),
    );

    let mut outcomes = vec![a, b];
    outcomes.sort_by_key(|outcome| *outcome == ShutdownOutcome::AlreadyInProgress);
    assert_eq!(
        outcomes,
        vec![
            ShutdownOutcome::Completed,
            ShutdownOutcome::AlreadyInProgress
        ]
    );
    assert_eq!(notifier.calls().len(), 1);

    // A late trigger can still wait for the winner to finish.
    coordinator.wait_exited().await;
    assert_eq!(
        coordinator.shutdown(ShutdownTrigger::PresentationRequest).await,
        ShutdownOutcome::AlreadyInProgress
    );
}

#[tokio::test]
async fn failed_notification_does_not_block_exit() {
    let (ctx, notifier) = live_runtime(Reply::Fail);
    start_both(&ctx).await;

    assert_eq!(
        ctx.coordinator
            .shutdown(ShutdownTrigger::AppExitRequested)
            .await,
        ShutdownOutcome::Completed
    );
    assert_eq!(notifier.calls().len(), 1);
    assert_eq!(ctx.coordinator.phase(), ShutdownPhase::Exited);
}

#[tokio::test]
async fn hanging_notification_is_bounded_by_the_timeout() {
    let (ctx, notifier) = live_runtime(Reply::Hang);
    start_both(&ctx).await;

    let started = Instant::now();
    ctx.coordinator.shutdown(ShutdownTrigger::OsSignal).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(notifier.calls().len(), 1);
    assert_eq!(ctx.coordinator.phase(), ShutdownPhase::Exited);
}

#[tokio::test]
async fn no_camera_means_no_notification() {
    let (ctx, notifier) = live_runtime(Reply::Accept);
    ctx.bridge
        .start_watcher(WatcherKind::Printer, &[])
        .await
        .unwrap();

    ctx.coordinator
        .shutdown(ShutdownTrigger::LastWindowClosed)
        .await;

    assert!(notifier.calls().is_empty());
    assert_eq!(
        ctx.bridge.registry().get(WatcherKind::Printer).state(),
        WatcherState::Stopped
    );
}

#[tokio::test]
async fn start_queued_behind_a_stop_does_not_outlive_shutdown() {
    let resolver = Arc::new(ScriptResolver::new().with(
        Worker::PrinterWatcher,
        "trap '' TERM; while true; do sleep 0.1; done",
    ));
    let ctx = runtime_with_notifier(resolver.clone(), FakeNotifier::new(Reply::Accept));
    let supervisor = ctx.bridge.registry().get(WatcherKind::Printer);
    ctx.bridge
        .start_watcher(WatcherKind::Printer, &[])
        .await
        .unwrap();
    // Give the shell time to install its trap; the stop then waits out the grace.
    tokio::time::sleep(Duration::from_millis(200)).await;

    supervisor.request_stop().await;
    let queued = tokio::spawn({
        let bridge = ctx.bridge.clone();
        async move { bridge.start_watcher(WatcherKind::Printer, &[]).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let outcome = ctx
        .coordinator
        .shutdown(ShutdownTrigger::LastWindowClosed)
        .await;
    assert_eq!(outcome, ShutdownOutcome::Completed);
    assert_eq!(ctx.coordinator.phase(), ShutdownPhase::Exited);

    let err = queued.await.unwrap().unwrap_err();
    assert!(matches!(err, BridgeError::ShuttingDown), "{err:?}");
    assert_eq!(supervisor.state(), WatcherState::Stopped);
    assert!(supervisor.pid().await.is_none());
    assert_eq!(resolver.resolved(), 1);
}

#[tokio::test]
async fn watchers_cannot_start_once_quitting() {
    let (ctx, _notifier) = live_runtime(Reply::Accept);
    ctx.coordinator.shutdown(ShutdownTrigger::OsSignal).await;

    let err = ctx
        .bridge
        .start_watcher(WatcherKind::Printer, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::ShuttingDown));
}

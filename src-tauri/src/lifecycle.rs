//! Application lifecycle and shutdown orchestration.

use ragpiq_runtime::{ShutdownOutcome, ShutdownTrigger, wait_for_termination_signal};
use tauri::{AppHandle, Manager};
use tracing::{debug, info, warn};

use crate::app::AppState;

/// Run the runtime's shutdown sequence under a watchdog.
///
/// # Shutdown sequence
/// 1. Spawn watchdog thread (force exit after `RAGPIQ_SHUTDOWN_WATCHDOG_MS`)
/// 2. Stop every active watcher and wait for its exit
/// 3. Send the exit notification for the last camera session
/// 4. Cancel watchdog and return
///
/// A second trigger arriving mid-sequence waits for the first one to finish
/// instead of repeating it.
pub async fn perform_shutdown(state: &AppState, trigger: ShutdownTrigger) {
    info!(%trigger, "Starting graceful shutdown");

    let watchdog = state.config.shutdown_watchdog;
    let (watchdog_cancel_tx, mut watchdog_cancel_rx) = tokio::sync::oneshot::channel::<()>();
    std::thread::spawn(move || {
        std::thread::sleep(watchdog);
        if watchdog_cancel_rx.try_recv().is_err() {
            eprintln!(
                "SHUTDOWN WATCHDOG: cleanup exceeded {}ms - forcing exit",
                watchdog.as_millis()
            );
            std::process::exit(1);
        }
    });

    let runtime = &state.runtime;
    let outcome = match trigger {
        ShutdownTrigger::PresentationRequest => runtime.bridge.request_exit().await,
        other => runtime.coordinator.shutdown(other).await,
    };

    if outcome == ShutdownOutcome::AlreadyInProgress {
        debug!(%trigger, "Shutdown already running, waiting for it");
        runtime.coordinator.wait_exited().await;
    }

    let _ = watchdog_cancel_tx.send(());
}

/// Hide every window, shut down in the background, then exit the app.
pub fn shutdown_and_exit(app: &AppHandle, trigger: ShutdownTrigger) {
    for (label, window) in app.webview_windows() {
        if let Err(e) = window.hide() {
            debug!(error = %e, window = %label, "Failed to hide window");
        }
    }

    let handle = app.clone();
    tauri::async_runtime::spawn(async move {
        if let Some(state) = handle.try_state::<AppState>() {
            perform_shutdown(&state, trigger).await;
        }
        handle.exit(0);
    });
}

/// Route SIGINT/SIGTERM (Ctrl-C elsewhere) through the same shutdown path.
pub fn spawn_signal_listener(app: AppHandle) {
    tauri::async_runtime::spawn(async move {
        match wait_for_termination_signal().await {
            Ok(signal) => {
                info!(signal, "Termination signal received");
                shutdown_and_exit(&app, ShutdownTrigger::OsSignal);
            }
            Err(e) => warn!(error = %e, "Failed to install termination signal handlers"),
        }
    });
}

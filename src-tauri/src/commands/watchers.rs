//! Watcher commands.

use ragpiq_core::{UnknownKind, WatcherKind};
use ragpiq_runtime::StartStatus;
use tauri::State;

use crate::app::AppState;

/// Start a watcher. Returns `"started"` or `"already running"`.
///
/// For the camera watcher the first argument is the camera identifier.
#[tauri::command]
pub async fn start_watcher(
    kind: String,
    args: Option<Vec<String>>,
    state: State<'_, AppState>,
) -> Result<&'static str, String> {
    let kind: WatcherKind = kind.parse().map_err(|e: UnknownKind| e.to_string())?;
    let args = args.unwrap_or_default();

    state
        .runtime
        .bridge
        .start_watcher(kind, &args)
        .await
        .map(StartStatus::as_str)
        .map_err(|e| e.to_string())
}

/// Stop a watcher. Returns `"stopped"` or `"not running"`.
#[tauri::command]
pub async fn stop_watcher(kind: String, state: State<'_, AppState>) -> Result<&'static str, String> {
    let kind: WatcherKind = kind.parse().map_err(|e: UnknownKind| e.to_string())?;

    Ok(state.runtime.bridge.stop_watcher(kind).await.as_str())
}

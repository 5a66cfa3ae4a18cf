//! Application commands.

use ragpiq_runtime::ShutdownTrigger;
use tauri::AppHandle;

use crate::lifecycle;

/// Quit the app on behalf of the page.
///
/// Returns as soon as the shutdown is scheduled; watchers are stopped and
/// the exit notification sent before the process exits.
#[tauri::command]
pub fn app_exit(app: AppHandle) {
    lifecycle::shutdown_and_exit(&app, ShutdownTrigger::PresentationRequest);
}

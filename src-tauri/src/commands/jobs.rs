//! Job commands.
//!
//! Job failures are not command errors: the outcome carries them, and the
//! same outcome is pushed on `label-log`.

use ragpiq_core::{JobKind, JobOutcome, JobSpec, LabelRequest, UnknownKind};
use tauri::State;

use crate::app::AppState;

#[tauri::command]
pub async fn run_job(
    kind: String,
    args: Option<Vec<String>>,
    state: State<'_, AppState>,
) -> Result<JobOutcome, String> {
    let kind: JobKind = kind.parse().map_err(|e: UnknownKind| e.to_string())?;
    let job = JobSpec::new(kind, args.unwrap_or_default());

    Ok(state.runtime.bridge.run_job(&job).await)
}

/// Print one label from the page's `{ qr, barcode, created }` payload.
#[tauri::command]
pub async fn print_label(
    label: LabelRequest,
    state: State<'_, AppState>,
) -> Result<JobOutcome, String> {
    Ok(state.runtime.bridge.print_label(label).await)
}

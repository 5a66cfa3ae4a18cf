//! Application log commands.
//!
//! Frontend logs are mapped to tracing events with the target
//! `ragpiq_frontend`; the page's category becomes a structured field.

use serde::Deserialize;

/// Frontend log entry as sent by the page.
#[derive(Debug, Deserialize)]
pub struct FrontendLogEntry {
    pub timestamp: String,
    pub level: String,
    pub category: String,
    pub message: String,
    /// JSON string
    #[serde(default)]
    pub data: Option<String>,
}

macro_rules! frontend_event {
    ($level:ident, $entry:expr) => {
        tracing::$level!(
            target: "ragpiq_frontend",
            category = %$entry.category,
            timestamp = %$entry.timestamp,
            data = $entry.data.as_deref(),
            "{}",
            $entry.message
        )
    };
}

/// Bridge frontend logs into Rust tracing.
///
/// ```bash
/// # Show all frontend logs
/// RUST_LOG=ragpiq_frontend=debug
/// ```
#[tauri::command]
pub fn log_from_frontend(entry: FrontendLogEntry) {
    match entry.level.as_str() {
        "trace" => frontend_event!(trace, entry),
        "debug" => frontend_event!(debug, entry),
        "warn" => frontend_event!(warn, entry),
        "error" => frontend_event!(error, entry),
        _ => frontend_event!(info, entry),
    }
}

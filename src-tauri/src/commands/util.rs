//! Utility commands.

/// Open a URL in the system's default browser.
///
/// Used by the page for links that must leave the app window.
#[tauri::command]
pub async fn open_external(url: String) -> Result<(), String> {
    let url = url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://") || url.starts_with("mailto:")) {
        return Err(format!("Refusing to open unsupported URL: {url}"));
    }

    open::that(url).map_err(|e| format!("Failed to open URL: {e}"))
}

// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod commands;
mod lifecycle;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use app::AppState;
use dotenvy::dotenv;
use ragpiq_core::{InstallLayout, ShellConfig};
use ragpiq_runtime::{ShutdownPhase, ShutdownTrigger, bootstrap};
use tauri::webview::PageLoadEvent;
use tauri::{AppHandle, Manager, RunEvent, Url, WebviewUrl, WebviewWindowBuilder, WindowEvent};
use tracing::{debug, error, info, warn};

const MAIN_WINDOW: &str = "main";
const SPLASH_WINDOW: &str = "splash";

/// How long the splash stays up after the remote page finished loading.
const SPLASH_HOLD: Duration = Duration::from_secs(1);

/// Initialize tracing with file appender for persistent logs.
///
/// Logs are written to:
/// - stdout (for console viewing)
/// - {data_dir}/logs/ragpiq-link.{date} (daily rotation via tracing-appender)
///
/// Log level is controlled by RUST_LOG environment variable (default: info).
fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let log_dir = match ragpiq_core::paths::data_root() {
        Ok(root) => root.join("logs"),
        Err(e) => {
            eprintln!("Failed to get data root for logs: {e}");
            PathBuf::from(".")
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory: {e}");
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "ragpiq-link");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .compact(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact(),
        )
        .try_init()
        .ok();

    // The writer flushes on drop; keep it for the life of the process.
    std::mem::forget(guard);
}

fn main() {
    let _ = dotenv();

    init_tracing();

    info!("Ragpiq Link starting");

    let config = match ShellConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    tauri::Builder::default()
        .setup(move |app| setup_app(app, config).map_err(Into::into))
        .on_window_event(|window, event| {
            if let WindowEvent::CloseRequested { api, .. } = event {
                // The splash closes itself; only the main window ends the app.
                if window.label() != MAIN_WINDOW {
                    return;
                }
                info!("Main window close requested - performing graceful shutdown");
                api.prevent_close();
                lifecycle::shutdown_and_exit(window.app_handle(), ShutdownTrigger::LastWindowClosed);
            }
        })
        .invoke_handler(tauri::generate_handler![
            // Watchers
            commands::watchers::start_watcher,
            commands::watchers::stop_watcher,
            // Jobs
            commands::jobs::run_job,
            commands::jobs::print_label,
            // Push channels
            commands::channels::subscribe,
            // Application
            commands::app::app_exit,
            // OS integration: shell
            commands::util::open_external,
            // Frontend logging: bridge to Rust tracing
            commands::app_logs::log_from_frontend,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { api, .. } => {
                let finished = app_handle
                    .try_state::<AppState>()
                    .is_none_or(|state| state.runtime.coordinator.phase() == ShutdownPhase::Exited);
                if finished {
                    return;
                }

                info!("App exit requested - performing graceful shutdown");
                api.prevent_exit();
                lifecycle::shutdown_and_exit(app_handle, ShutdownTrigger::AppExitRequested);
            }
            RunEvent::Exit => info!("App exiting"),
            _ => {}
        });
}

/// Application setup hook: compose the runtime and open the main window.
fn setup_app(app: &mut tauri::App, config: ShellConfig) -> anyhow::Result<()> {
    let resource_dir = app
        .path()
        .resource_dir()
        .context("Failed to resolve resource directory")?;
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let dev_root = manifest_dir.parent().unwrap_or(manifest_dir);

    let runtime = bootstrap(&config, InstallLayout::new(dev_root, resource_dir))
        .context("Failed to bootstrap runtime")?;
    app::events::install_app_listeners(app.handle(), &runtime.bridge);

    let remote_url: Url = config
        .remote_url
        .parse()
        .with_context(|| format!("Invalid remote URL {:?}", config.remote_url))?;

    app.manage(AppState::new(runtime, config));

    create_main_window(app.handle(), remote_url).context("Failed to create main window")?;
    lifecycle::spawn_signal_listener(app.handle().clone());

    Ok(())
}

/// Create the hidden main window; it is revealed once the remote page loads.
fn create_main_window(app: &AppHandle, url: Url) -> tauri::Result<()> {
    info!(%url, "Loading remote page");

    WebviewWindowBuilder::new(app, MAIN_WINDOW, WebviewUrl::External(url))
        .title("Ragpiq Link")
        .inner_size(1200.0, 800.0)
        .resizable(false)
        .decorations(false)
        .visible(false)
        .center()
        .on_page_load(|window, payload| {
            if matches!(payload.event(), PageLoadEvent::Finished) {
                debug!(url = %payload.url(), "Remote page finished loading");
                reveal_main_window(window.app_handle().clone());
            }
        })
        .build()?;

    Ok(())
}

/// Swap the splash for the main window after [`SPLASH_HOLD`].
///
/// Later page loads find no splash and leave the windows alone.
fn reveal_main_window(app: AppHandle) {
    let Some(splash) = app.get_webview_window(SPLASH_WINDOW) else {
        return;
    };

    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(SPLASH_HOLD).await;

        if let Some(main) = app.get_webview_window(MAIN_WINDOW) {
            if let Err(e) = main.show() {
                warn!(error = %e, "Failed to show main window");
            }
            let _ = main.set_focus();
        }
        if let Err(e) = splash.close() {
            debug!(error = %e, "Splash window already gone");
        }
    });
}

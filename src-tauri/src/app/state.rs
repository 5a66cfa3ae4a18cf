//! Application state shared across all Tauri commands.

use ragpiq_core::ShellConfig;
use ragpiq_runtime::RuntimeContext;

/// Application state.
///
/// Managed by Tauri and accessible to all commands via
/// `tauri::State<'_, AppState>`.
pub struct AppState {
    /// Composed runtime: bridge, watcher registry and shutdown coordinator.
    pub runtime: RuntimeContext,
    /// Configuration the runtime was built from.
    pub config: ShellConfig,
}

impl AppState {
    pub const fn new(runtime: RuntimeContext, config: ShellConfig) -> Self {
        Self { runtime, config }
    }
}

//! Event delivery from the runtime's push channels to the webview.
//!
//! Each push channel starts out with an [`AppEmitListener`] so pages using
//! `listen("printer-status", ...)` receive events straight away. A page that
//! calls the `subscribe` command swaps it for a [`ChannelListener`] bound to
//! its own IPC channel.

use std::sync::Arc;

use ragpiq_core::{EventListener, PushChannel, StatusEvent};
use ragpiq_runtime::StatusBridge;
use serde::Serialize;
use tauri::ipc::Channel;
use tauri::{AppHandle, Emitter};
use tracing::{error, warn};

/// Emit an event to the frontend, logging any errors.
pub fn emit_or_log<T: Serialize + Clone>(app: &AppHandle, event: &str, payload: T) {
    if let Err(e) = app.emit(event, payload) {
        error!(error = %e, event, "Failed to emit event");
    }
}

/// Broadcasts events as global app events named after their channel.
pub struct AppEmitListener {
    app: AppHandle,
}

impl AppEmitListener {
    pub const fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl EventListener for AppEmitListener {
    fn deliver(&self, event: &StatusEvent) {
        emit_or_log(&self.app, event.channel().name(), event.clone());
    }
}

/// Forwards events to one IPC channel handed over by the page.
pub struct ChannelListener {
    channel: Channel<StatusEvent>,
}

impl ChannelListener {
    pub const fn new(channel: Channel<StatusEvent>) -> Self {
        Self { channel }
    }
}

impl EventListener for ChannelListener {
    fn deliver(&self, event: &StatusEvent) {
        if let Err(e) = self.channel.send(event.clone()) {
            warn!(
                error = %e,
                channel = %event.channel(),
                ipc_channel = self.channel.id(),
                "Failed to deliver event over IPC channel"
            );
        }
    }
}

/// Register an [`AppEmitListener`] on every push channel.
pub fn install_app_listeners(app: &AppHandle, bridge: &StatusBridge) {
    for channel in PushChannel::ALL {
        bridge.subscribe(channel, Arc::new(AppEmitListener::new(app.clone())));
    }
}

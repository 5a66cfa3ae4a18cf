//! Push-channel subscription.

use std::sync::Arc;

use ragpiq_core::{PushChannel, StatusEvent, UnknownKind};
use tauri::State;
use tauri::ipc::Channel;
use tracing::debug;

use crate::app::AppState;
use crate::app::events::ChannelListener;

/// Route `channel` to the page's IPC channel, replacing any previous listener.
#[tauri::command]
pub fn subscribe(
    channel: String,
    on_event: Channel<StatusEvent>,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let channel: PushChannel = channel.parse().map_err(|e: UnknownKind| e.to_string())?;
    let ipc_channel = on_event.id();

    let replaced = state
        .runtime
        .bridge
        .subscribe(channel, Arc::new(ChannelListener::new(on_event)));

    debug!(%channel, ipc_channel, replaced, "Push channel subscribed");
    Ok(())
}

//! Tauri command handlers.
//!
//! Every command is a thin adapter over [`ragpiq_runtime::StatusBridge`]:
//! - watchers: start/stop the long-running printer and camera watchers
//! - jobs: one-shot jobs such as label printing
//! - channels: push-channel subscription
//! - app: quit requests from the page
//! - util: OS integration
//! - app_logs: frontend-to-backend logging bridge

pub mod app;
pub mod app_logs;
pub mod channels;
pub mod jobs;
pub mod util;
pub mod watchers;

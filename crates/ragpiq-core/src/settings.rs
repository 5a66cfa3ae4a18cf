//! Shell configuration.
//!
//! Every setting comes from an environment variable with a default. Parsing
//! goes through a lookup function so tests never touch the process
//! environment.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::paths::BuildMode;

/// Remote page the main window loads.
pub const DEFAULT_REMOTE_URL: &str = "https://ragpiq.com/ragpiq_link_desktop";

/// Collection endpoint receiving the camera identifier on exit.
pub const DEFAULT_NOTIFY_URL: &str = "https://n8n2.ragpiq.com/6315c648-8d7e-4273-8c8b-669164a2fce3";

/// Query parameter carrying the identifier.
pub const DEFAULT_NOTIFY_PARAM: &str = "camera_id";

pub const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 3_000;

/// Grace period between SIGTERM and SIGKILL when stopping a watcher.
pub const DEFAULT_STOP_GRACE_MS: u64 = 5_000;

/// Hard limit after which the host force-exits a stuck shutdown.
pub const DEFAULT_SHUTDOWN_WATCHDOG_MS: u64 = 10_000;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{key}={value:?} is invalid: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Resolved configuration of the desktop shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellConfig {
    pub remote_url: String,
    pub notify_url: String,
    pub notify_param: String,
    pub notify_timeout: Duration,
    /// Whether the exit notification step runs at all.
    pub notify_on_exit: bool,
    pub stop_grace: Duration,
    pub shutdown_watchdog: Duration,
    /// Interpreter override; `None` uses the bundled one.
    pub python: Option<PathBuf>,
    /// Resource directory override; `None` uses the host's resource dir.
    pub resource_dir: Option<PathBuf>,
    /// Source checkout override; `None` uses the crate's repository root.
    pub dev_root: Option<PathBuf>,
    pub build_mode: BuildMode,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            notify_url: DEFAULT_NOTIFY_URL.to_string(),
            notify_param: DEFAULT_NOTIFY_PARAM.to_string(),
            notify_timeout: Duration::from_millis(DEFAULT_NOTIFY_TIMEOUT_MS),
            notify_on_exit: true,
            stop_grace: Duration::from_millis(DEFAULT_STOP_GRACE_MS),
            shutdown_watchdog: Duration::from_millis(DEFAULT_SHUTDOWN_WATCHDOG_MS),
            python: None,
            resource_dir: None,
            dev_root: None,
            build_mode: BuildMode::current(),
        }
    }
}

impl ShellConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("RAGPIQ_REMOTE_URL") {
            config.remote_url = url;
        }
        if let Some(url) = get("RAGPIQ_NOTIFY_URL") {
            config.notify_url = url;
        }
        if let Some(param) = get("RAGPIQ_NOTIFY_PARAM") {
            config.notify_param = param;
        }
        if let Some(raw) = get("RAGPIQ_NOTIFY_TIMEOUT_MS") {
            config.notify_timeout = parse_millis("RAGPIQ_NOTIFY_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = get("RAGPIQ_NOTIFY_ON_EXIT") {
            config.notify_on_exit = parse_bool("RAGPIQ_NOTIFY_ON_EXIT", &raw)?;
        }
        if let Some(raw) = get("RAGPIQ_STOP_GRACE_MS") {
            config.stop_grace = parse_millis("RAGPIQ_STOP_GRACE_MS", &raw)?;
        }
        if let Some(raw) = get("RAGPIQ_SHUTDOWN_WATCHDOG_MS") {
            config.shutdown_watchdog = parse_millis("RAGPIQ_SHUTDOWN_WATCHDOG_MS", &raw)?;
        }
        config.python = get("RAGPIQ_PYTHON").map(PathBuf::from);
        config.resource_dir = get("RAGPIQ_RESOURCE_DIR").map(PathBuf::from);
        config.dev_root = get("RAGPIQ_DEV_ROOT").map(PathBuf::from);
        if let Some(raw) = get("RAGPIQ_BUILD_MODE") {
            config.build_mode = raw.parse().map_err(|reason| SettingsError::InvalidValue {
                key: "RAGPIQ_BUILD_MODE",
                value: raw.clone(),
                reason,
            })?;
        }

        Ok(config)
    }
}

fn parse_millis(key: &'static str, raw: &str) -> Result<Duration, SettingsError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| SettingsError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

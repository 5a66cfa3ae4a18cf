//! Runtime composition root.
//!
//! This is the only place where the locator, supervisors, job runner,
//! push channels, notifier and shutdown coordinator are wired together.
//! Hosts hold the resulting [`RuntimeContext`] and talk to it through the
//! [`StatusBridge`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ragpiq_core::{
    InstallLayout, NoopNotifier, Platform, ShellConfig, ShutdownNotifier, WorkerLocator,
    WorkerResolver,
};

use crate::bridge::{PushChannels, StatusBridge};
use crate::jobs::JobRunner;
use crate::lifecycle::{ShutdownCoordinator, ShutdownPlan};
use crate::notify::HttpNotifier;
use crate::supervisor::WatcherRegistry;

/// Timings the runtime needs from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeTimings {
    /// How long a worker may take to honour SIGTERM before SIGKILL.
    pub stop_grace: Duration,
    /// Upper bound on the termination notification.
    pub notify_timeout: Duration,
}

impl From<&ShellConfig> for RuntimeTimings {
    fn from(config: &ShellConfig) -> Self {
        Self {
            stop_grace: config.stop_grace,
            notify_timeout: config.notify_timeout,
        }
    }
}

/// Fully composed runtime.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    pub bridge: StatusBridge,
    pub coordinator: Arc<ShutdownCoordinator>,
    pub channels: Arc<PushChannels>,
}

impl RuntimeContext {
    /// Wire a runtime from explicit parts.
    pub fn from_parts(
        resolver: Arc<dyn WorkerResolver>,
        notifier: Arc<dyn ShutdownNotifier>,
        plan: ShutdownPlan,
        timings: RuntimeTimings,
    ) -> Self {
        let channels = Arc::new(PushChannels::new());
        let registry = WatcherRegistry::new(
            Arc::clone(&resolver),
            Arc::clone(&channels),
            timings.stop_grace,
        );
        let jobs = JobRunner::new(resolver, timings.stop_grace);
        let coordinator = Arc::new(ShutdownCoordinator::new(
            registry.clone(),
            notifier,
            plan,
            timings.notify_timeout,
        ));
        let bridge = StatusBridge::new(
            registry,
            jobs,
            Arc::clone(&channels),
            Arc::clone(&coordinator),
        );

        Self {
            bridge,
            coordinator,
            channels,
        }
    }
}

/// Build the production runtime.
///
/// `defaults` supplies the host's own idea of where resources live;
/// `RAGPIQ_RESOURCE_DIR` and `RAGPIQ_DEV_ROOT` override it.
pub fn bootstrap(config: &ShellConfig, defaults: InstallLayout) -> Result<RuntimeContext> {
    let layout = InstallLayout {
        dev_root: config.dev_root.clone().unwrap_or(defaults.dev_root),
        resource_dir: config.resource_dir.clone().unwrap_or(defaults.resource_dir),
    };
    let platform = Platform::current();

    tracing::info!(
        target: "ragpiq.paths",
        mode = ?config.build_mode,
        ?platform,
        dev_root = %layout.dev_root.display(),
        resource_dir = %layout.resource_dir.display(),
        python_override = ?config.python,
        "Resolved worker layout"
    );

    let locator = WorkerLocator::new(config.build_mode, platform, layout)
        .with_python_override(config.python.clone());

    let (notifier, plan): (Arc<dyn ShutdownNotifier>, ShutdownPlan) = if config.notify_on_exit {
        let notifier = HttpNotifier::new(
            &config.notify_url,
            config.notify_param.clone(),
            config.notify_timeout,
        )
        .context("Failed to create shutdown notifier")?;
        (Arc::new(notifier), ShutdownPlan::FULL)
    } else {
        (Arc::new(NoopNotifier), ShutdownPlan::STOP_ONLY)
    };

    Ok(RuntimeContext::from_parts(
        Arc::new(locator),
        notifier,
        plan,
        RuntimeTimings::from(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragpiq_core::{BuildMode, WatcherState};

    fn config(lookup: &[(&str, &str)]) -> ShellConfig {
        let vars: Vec<(String, String)> = lookup
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ShellConfig::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn bootstrap_with_defaults_starts_idle() {
        let ctx = bootstrap(&config(&[]), InstallLayout::new("/dev", "/res")).unwrap();

        assert!(!ctx.coordinator.is_quitting());
        assert_eq!(ctx.coordinator.plan(), ShutdownPlan::FULL);
        for (_, state) in ctx.bridge.registry().states() {
            assert_eq!(state, WatcherState::Stopped);
        }
    }

    #[test]
    fn disabled_notification_uses_stop_only_plan() {
        let ctx = bootstrap(
            &config(&[("RAGPIQ_NOTIFY_ON_EXIT", "false")]),
            InstallLayout::new("/dev", "/res"),
        )
        .unwrap();
        assert_eq!(ctx.coordinator.plan(), ShutdownPlan::STOP_ONLY);
    }

    #[test]
    fn invalid_notify_url_fails_bootstrap() {
        let err = bootstrap(
            &config(&[("RAGPIQ_NOTIFY_URL", "not a url")]),
            InstallLayout::new("/dev", "/res"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("shutdown notifier"));
    }

    #[test]
    fn timings_follow_config() {
        let config = config(&[
            ("RAGPIQ_STOP_GRACE_MS", "250"),
            ("RAGPIQ_BUILD_MODE", "packaged"),
        ]);
        assert_eq!(config.build_mode, BuildMode::Packaged);
        assert_eq!(
            RuntimeTimings::from(&config).stop_grace,
            Duration::from_millis(250)
        );
    }
}

//! OS termination signals.
//!
//! Unix listens for `SIGINT`, `SIGTERM` and `SIGQUIT`; other platforms for
//! Ctrl-C only. Hosts feed the result into the shutdown coordinator as
//! [`ShutdownTrigger::OsSignal`](crate::lifecycle::ShutdownTrigger::OsSignal).

/// Wait for a termination signal and return its name.
#[cfg(unix)]
pub async fn wait_for_termination_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Wait for a termination signal and return its name.
#[cfg(not(unix))]
pub async fn wait_for_termination_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}

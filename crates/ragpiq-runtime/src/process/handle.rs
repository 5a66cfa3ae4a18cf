//! One live worker process.
//!
//! A [`ProcessHandle`] owns the only way to signal its process. A reaper task
//! owns the `Child` itself: it waits for exit, runs graceful termination
//! when asked, and publishes the final [`ExitReport`] on a watch channel.
//! Output is exposed either as a channel of line events or as buffers
//! captured until exit.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use ragpiq_core::LaunchSpec;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::shutdown::terminate_child;
use super::stream::{spawn_capture, spawn_line_reader};
use super::types::{CapturedOutput, ExitReport, OutputLine, OutputMode, StreamKind};

enum HandleOutput {
    Streamed(Option<mpsc::UnboundedReceiver<OutputLine>>),
    Captured {
        stdout: JoinHandle<String>,
        stderr: JoinHandle<String>,
    },
}

/// Handle to a spawned worker process.
pub struct ProcessHandle {
    pid: Option<u32>,
    command: String,
    terminate_tx: Option<oneshot::Sender<()>>,
    exit_rx: watch::Receiver<Option<ExitReport>>,
    output: HandleOutput,
}

impl ProcessHandle {
    /// Spawn the process described by `spec`.
    ///
    /// Must be called from within a Tokio runtime. Fails when the entrypoint
    /// script is missing or the OS refuses to launch the program; the
    /// process is never left half-started.
    pub fn spawn(spec: &LaunchSpec, mode: OutputMode, grace: Duration) -> io::Result<Self> {
        if let Some(entrypoint) = &spec.entrypoint {
            if !entrypoint.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("worker script not found: {}", entrypoint.display()),
                ));
            }
        }

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .env_clear()
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;
        let pid = child.id();
        let command = spec.display_command();
        debug!(?pid, %command, ?mode, "Spawned worker process");

        let output = match mode {
            OutputMode::Streamed => {
                let (tx, rx) = mpsc::unbounded_channel();
                if let Some(stdout) = child.stdout.take() {
                    spawn_line_reader(stdout, pid, StreamKind::Stdout, tx.clone());
                }
                if let Some(stderr) = child.stderr.take() {
                    spawn_line_reader(stderr, pid, StreamKind::Stderr, tx);
                }
                HandleOutput::Streamed(Some(rx))
            }
            OutputMode::Captured => HandleOutput::Captured {
                stdout: capture(child.stdout.take(), pid, StreamKind::Stdout),
                stderr: capture(child.stderr.take(), pid, StreamKind::Stderr),
            },
        };

        let (terminate_tx, terminate_rx) = oneshot::channel();
        let (exit_tx, exit_rx) = watch::channel(None);
        tokio::spawn(reap(child, pid, terminate_rx, exit_tx, grace));

        Ok(Self {
            pid,
            command,
            terminate_tx: Some(terminate_tx),
            exit_rx,
            output,
        })
    }

    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Command line the process was launched with.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Ask the process to terminate. Returns `false` if already requested.
    ///
    /// Does not wait; observe completion through [`Self::exit_watch`].
    pub fn terminate(&mut self) -> bool {
        match self.terminate_tx.take() {
            Some(tx) => {
                // The reaper may already have finished; that is fine.
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub const fn termination_requested(&self) -> bool {
        self.terminate_tx.is_none()
    }

    /// Exit report, if the process has already ended.
    pub fn exit_report(&self) -> Option<ExitReport> {
        *self.exit_rx.borrow()
    }

    /// A future-producing view of this process's exit.
    pub fn exit_watch(&self) -> ExitWatch {
        ExitWatch {
            rx: self.exit_rx.clone(),
        }
    }

    /// Take the line-event stream. Only the first call returns it.
    pub fn take_lines(&mut self) -> Option<mpsc::UnboundedReceiver<OutputLine>> {
        match &mut self.output {
            HandleOutput::Streamed(rx) => rx.take(),
            HandleOutput::Captured { .. } => None,
        }
    }

    /// Wait for exit and collect captured output.
    ///
    /// Streamed handles return empty buffers.
    pub async fn wait_with_output(self) -> CapturedOutput {
        let exit = self.exit_watch().wait().await;

        let (stdout, stderr) = match self.output {
            HandleOutput::Captured { stdout, stderr } => (
                stdout.await.unwrap_or_default(),
                stderr.await.unwrap_or_default(),
            ),
            HandleOutput::Streamed(_) => (String::new(), String::new()),
        };

        CapturedOutput {
            exit,
            stdout,
            stderr,
        }
    }
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("command", &self.command)
            .field("termination_requested", &self.termination_requested())
            .field("exit", &self.exit_report())
            .finish_non_exhaustive()
    }
}

/// Completion signal of one process, cloneable and independent of the handle.
#[derive(Debug, Clone)]
pub struct ExitWatch {
    rx: watch::Receiver<Option<ExitReport>>,
}

impl ExitWatch {
    /// Resolve once the OS has reported the process's exit.
    pub async fn wait(mut self) -> ExitReport {
        let report = self
            .rx
            .wait_for(Option::is_some)
            .await
            .map(|current| *current)
            .ok()
            .flatten();

        // A missing report means the reaper itself went away.
        report.unwrap_or_else(|| ExitReport::unknown(false))
    }

    pub fn has_exited(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

fn capture(
    stream: Option<impl tokio::io::AsyncRead + Unpin + Send + 'static>,
    pid: Option<u32>,
    kind: StreamKind,
) -> JoinHandle<String> {
    match stream {
        Some(stream) => spawn_capture(stream, pid, kind),
        None => tokio::spawn(async { String::new() }),
    }
}

enum Wake {
    Exited(io::Result<ExitStatus>),
    Terminate,
}

async fn reap(
    mut child: Child,
    pid: Option<u32>,
    terminate_rx: oneshot::Receiver<()>,
    exit_tx: watch::Sender<Option<ExitReport>>,
    grace: Duration,
) {
    // A dropped sender disables the terminate branch; the process keeps running.
    let wake = tokio::select! {
        status = child.wait() => Wake::Exited(status),
        Ok(()) = terminate_rx => Wake::Terminate,
    };

    let report = match wake {
        Wake::Exited(status) => to_report(pid, status, false),
        Wake::Terminate => {
            debug!(?pid, "Terminating worker process");
            to_report(pid, terminate_child(&mut child, grace).await, true)
        }
    };

    debug!(?pid, %report, "Worker process exited");
    exit_tx.send_replace(Some(report));
}

fn to_report(pid: Option<u32>, status: io::Result<ExitStatus>, terminated: bool) -> ExitReport {
    match status {
        Ok(status) => ExitReport::from_status(status, terminated),
        Err(e) => {
            warn!(?pid, error = %e, "Failed to wait for worker process");
            ExitReport::unknown(terminated)
        }
    }
}

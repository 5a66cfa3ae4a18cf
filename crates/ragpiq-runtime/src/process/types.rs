//! Shared types for worker processes.

use std::fmt;
use std::process::ExitStatus;

/// Which standard stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// One line of worker output, newline stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: StreamKind,
    pub text: String,
}

/// How a handle exposes the worker's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Lines are delivered as they arrive (watchers).
    Streamed,
    /// Output is buffered in full until exit (jobs).
    Captured,
}

/// How a worker process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// Exit code, absent when killed by a signal or when waiting failed.
    pub code: Option<i32>,
    /// True when the process ended after we asked it to terminate.
    pub terminated: bool,
}

impl ExitReport {
    pub fn from_status(status: ExitStatus, terminated: bool) -> Self {
        Self {
            code: status.code(),
            terminated,
        }
    }

    /// The OS wait failed; the process is gone but its status is unknown.
    pub const fn unknown(terminated: bool) -> Self {
        Self {
            code: None,
            terminated,
        }
    }

    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None if self.terminated => f.write_str("terminated"),
            None => f.write_str("killed by signal"),
        }
    }
}

/// Everything a captured worker wrote, plus how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub exit: ExitReport,
    pub stdout: String,
    pub stderr: String,
}

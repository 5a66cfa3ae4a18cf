//! One-shot job workers.
//!
//! Each run owns its own process and buffers; runs never share state and
//! may overlap freely.

use std::sync::Arc;
use std::time::Duration;

use ragpiq_core::{JobOutcome, JobSpec, WorkerError, WorkerResolver};
use tracing::{debug, info, warn};

use crate::process::{OutputMode, ProcessHandle};

#[derive(Clone)]
pub struct JobRunner {
    resolver: Arc<dyn WorkerResolver>,
    grace: Duration,
}

impl JobRunner {
    pub fn new(resolver: Arc<dyn WorkerResolver>, grace: Duration) -> Self {
        Self { resolver, grace }
    }

    /// Run a job to completion. Failures are reported in the outcome.
    pub async fn run(&self, job: &JobSpec) -> JobOutcome {
        let worker = job.kind.worker();
        let spec = self.resolver.resolve(worker, &job.args);

        let handle = match ProcessHandle::spawn(&spec, OutputMode::Captured, self.grace) {
            Ok(handle) => handle,
            Err(e) => {
                let err = WorkerError::spawn(worker, &e);
                warn!(kind = %job.kind, command = %spec.display_command(), error = %err, "Job failed to start");
                return JobOutcome::error(err.to_string());
            }
        };

        let pid = handle.pid();
        debug!(kind = %job.kind, ?pid, "Job started");

        let output = handle.wait_with_output().await;
        let outcome = JobOutcome::from_exit(output.exit.success(), &output.stdout, &output.stderr);

        if outcome.is_success() {
            info!(kind = %job.kind, ?pid, "Job succeeded");
        } else {
            let failure = WorkerError::WorkerFailure {
                worker,
                message: format!("{} ({})", output.stderr.trim(), output.exit),
            };
            warn!(kind = %job.kind, ?pid, error = %failure, "Job failed");
        }

        outcome
    }
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("grace", &self.grace)
            .finish_non_exhaustive()
    }
}

//! Job handler trait and the overlap guard around it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use logvault_core::error::AppError;

use crate::scheduler::JobContext;

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes
    fn job_type(&self) -> &str;

    /// Run the job once and report what it did
    async fn execute(&self, ctx: &JobContext) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, retrying will not help
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure, the next firing may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Result of one attempted firing.
#[derive(Debug)]
pub enum RunOutcome {
    /// The handler finished.
    Completed(Value),
    /// The handler returned an error; the job stays scheduled.
    Failed(JobExecutionError),
    /// A previous firing was still running.
    Skipped,
}

/// A handler plus an "already running" flag.
///
/// The scheduler spawns every firing independently, so a slow run could
/// otherwise overlap with the next one.
#[derive(Debug)]
pub struct GuardedJob {
    handler: Arc<dyn JobHandler>,
    running: AtomicBool,
}

impl GuardedJob {
    /// Wrap a handler.
    pub fn new(handler: Arc<dyn JobHandler>) -> Self {
        Self {
            handler,
            running: AtomicBool::new(false),
        }
    }

    /// The wrapped handler's job type.
    pub fn job_type(&self) -> &str {
        self.handler.job_type()
    }

    /// Whether a run is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Execute the handler unless a previous run is still going.
    ///
    /// Errors are logged and returned in the outcome, never propagated.
    pub async fn run(&self, ctx: &JobContext) -> RunOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(job = self.job_type(), "Previous run still in progress, skipping");
            return RunOutcome::Skipped;
        }
        let _flag = RunningFlag(&self.running);

        tracing::info!(job = self.job_type(), "Executing job");
        match self.handler.execute(ctx).await {
            Ok(result) => {
                tracing::info!(job = self.job_type(), %result, "Job completed");
                RunOutcome::Completed(result)
            }
            Err(e) => {
                tracing::error!(job = self.job_type(), error = %e, "Job failed");
                RunOutcome::Failed(e)
            }
        }
    }
}

/// Clears the running flag when the run ends, including on panic.
struct RunningFlag<'a>(&'a AtomicBool);

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

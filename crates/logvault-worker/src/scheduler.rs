//! Cron scheduler wrapper.
//!
//! Everything that touches `tokio-cron-scheduler` types lives here, so the
//! rest of the crate sees job IDs, [`GuardedJob`]s and plain timestamps.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use uuid::Uuid;

use logvault_core::error::AppError;
use logvault_core::result::AppResult;

use crate::executor::GuardedJob;

/// Per-firing context handed to job handlers.
#[derive(Clone)]
pub struct JobContext {
    /// Scheduler ID of the firing job.
    pub job_id: Uuid,
    scheduler: Option<JobScheduler>,
}

impl std::fmt::Debug for JobContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobContext")
            .field("job_id", &self.job_id)
            .finish()
    }
}

impl JobContext {
    /// Context for a run that is not driven by the scheduler.
    pub fn detached() -> Self {
        Self {
            job_id: Uuid::nil(),
            scheduler: None,
        }
    }

    /// When this job fires next, if it is scheduled.
    pub async fn next_fire_time(&self) -> Option<DateTime<Utc>> {
        match &self.scheduler {
            Some(scheduler) => next_tick(scheduler, self.job_id).await,
            None => None,
        }
    }
}

/// Cron-based scheduler for the recurring jobs.
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Start firing registered jobs
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> AppResult<()> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Register `job` on a 6-field cron expression.
    pub async fn add_cron(&self, expr: &str, job: Arc<GuardedJob>) -> AppResult<Uuid> {
        let name = job.job_type().to_string();
        let cron_job = CronJob::new_async(expr, move |uuid, lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                let ctx = JobContext {
                    job_id: uuid,
                    scheduler: Some(lock),
                };
                job.run(&ctx).await;
            })
        })
        .map_err(|e| AppError::scheduler(format!("Failed to create {name} schedule: {e}")))?;

        let id = self
            .scheduler
            .add(cron_job)
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!("Registered: {} ({})", name, expr);
        Ok(id)
    }

    /// Register `job` to fire every `period`.
    pub async fn add_repeated(&self, period: Duration, job: Arc<GuardedJob>) -> AppResult<Uuid> {
        let name = job.job_type().to_string();
        let repeated = CronJob::new_repeated_async(period, move |uuid, lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                let ctx = JobContext {
                    job_id: uuid,
                    scheduler: Some(lock),
                };
                job.run(&ctx).await;
            })
        })
        .map_err(|e| AppError::scheduler(format!("Failed to create {name} schedule: {e}")))?;

        let id = self
            .scheduler
            .add(repeated)
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!("Registered: {} (every {}s)", name, period.as_secs());
        Ok(id)
    }

    /// Unregister a job. A run already in flight finishes normally.
    pub async fn remove(&self, id: &Uuid) -> AppResult<()> {
        self.scheduler
            .remove(id)
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to remove job {id}: {e}")))
    }

    /// When job `id` fires next.
    pub async fn next_fire_time(&self, id: Uuid) -> Option<DateTime<Utc>> {
        next_tick(&self.scheduler, id).await
    }
}

async fn next_tick(scheduler: &JobScheduler, id: Uuid) -> Option<DateTime<Utc>> {
    let mut scheduler = scheduler.clone();
    match scheduler.next_tick_for_job(id).await {
        Ok(next) => next,
        Err(e) => {
            tracing::warn!(job = %id, error = %e, "Could not read next fire time");
            None
        }
    }
}

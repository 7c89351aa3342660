//! Schedule controller: owns the scan and cleanup jobs and the retention
//! config that governs them.
//!
//! State machine:
//!
//! ```text
//! Uninitialized -> Initializing -> Running <-> Stopped
//!                        ^                        |
//!                        +------ initialize ------+   (after shutdown)
//! ```
//!
//! Every transition happens under one async mutex, so a reconfiguration
//! removes the old jobs before the new ones are registered and no caller
//! can observe both at once.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use logvault_core::error::AppError;
use logvault_core::result::AppResult;
use logvault_database::IndexStore;
use logvault_database::repositories::RetentionConfigRepository;
use logvault_entity::retention::{RetentionConfig, UpdateRetentionConfig};
use logvault_service::{LogScanner, OperationOutcome, RetentionManager};

use crate::cron;
use crate::executor::GuardedJob;
use crate::jobs::{LogScanJob, RetentionCleanupJob};
use crate::scheduler::CronScheduler;

/// Fixed interval of the scan job.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// `initialize` has not been called.
    Uninitialized,
    /// `initialize` is loading the config and registering jobs.
    Initializing,
    /// Both jobs are registered.
    Running,
    /// No jobs are registered (disabled, or shut down).
    Stopped,
}

/// Which recurring job a registration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Retention cleanup on the configured cron schedule.
    Cleanup,
    /// Scan of every service directory on [`SCAN_INTERVAL`].
    Scan,
}

/// A job currently registered with the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredJob {
    /// Scheduler job ID.
    pub id: Uuid,
    /// Job kind.
    pub kind: JobKind,
    /// Normalized cron expression, or the repeat interval.
    pub schedule: String,
}

#[derive(Debug)]
struct Inner {
    state: ControllerState,
    scheduler: Option<CronScheduler>,
    jobs: Vec<RegisteredJob>,
}

/// Owns the recurring jobs and hot-reloads them on config changes.
///
/// Constructed once by the entry point and shared behind an `Arc`.
#[derive(Debug)]
pub struct ScheduleController {
    config_repo: Arc<RetentionConfigRepository>,
    scanner: LogScanner,
    retention: RetentionManager,
    scan_job: Arc<GuardedJob>,
    cleanup_job: Arc<GuardedJob>,
    inner: Mutex<Inner>,
}

impl ScheduleController {
    /// Create an uninitialized controller.
    pub fn new(store: &IndexStore, scanner: LogScanner, retention: RetentionManager) -> Self {
        let config_repo = Arc::clone(&store.config);
        let scan_job = Arc::new(GuardedJob::new(Arc::new(LogScanJob::new(scanner.clone()))));
        let cleanup_job = Arc::new(GuardedJob::new(Arc::new(RetentionCleanupJob::new(
            retention.clone(),
            Arc::clone(&config_repo),
        ))));

        Self {
            config_repo,
            scanner,
            retention,
            scan_job,
            cleanup_job,
            inner: Mutex::new(Inner {
                state: ControllerState::Uninitialized,
                scheduler: None,
                jobs: Vec::new(),
            }),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ControllerState {
        self.inner.lock().await.state
    }

    /// Start the scheduler and register the jobs the persisted config asks for.
    ///
    /// A no-op while a scheduler is running. After [`shutdown`](Self::shutdown)
    /// it starts a fresh scheduler from the persisted config.
    pub async fn initialize(&self) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.scheduler.is_some() {
            tracing::debug!(state = ?inner.state, "Schedule controller already initialized");
            return Ok(());
        }
        let previous = inner.state;
        inner.state = ControllerState::Initializing;

        if let Err(e) = self.bootstrap(&mut inner).await {
            if let Some(scheduler) = inner.scheduler.take() {
                if let Err(shutdown_err) = scheduler.shutdown().await {
                    tracing::warn!(error = %shutdown_err, "Failed to stop scheduler after init error");
                }
            }
            inner.jobs.clear();
            inner.state = previous;
            return Err(e);
        }

        tracing::info!(state = ?inner.state, "Schedule controller initialized");
        Ok(())
    }

    /// Validate, persist, and apply a new retention config.
    ///
    /// Invalid input is rejected before anything is written. Once the
    /// controller is initialized the running jobs are replaced atomically.
    pub async fn update_config(&self, update: UpdateRetentionConfig) -> AppResult<RetentionConfig> {
        update
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid retention config: {e}")))?;
        cron::validate(&update.schedule)?;

        let mut inner = self.inner.lock().await;
        let config = self.config_repo.update_config(&update).await?;

        if inner.scheduler.is_none() {
            tracing::info!("Retention config saved; jobs start on initialization");
            return Ok(config);
        }

        self.apply(&mut inner, &config).await?;
        tracing::info!(
            enabled = config.enabled,
            retention_days = config.retention_days,
            schedule = %config.schedule,
            "Retention config applied"
        );
        self.config_repo.get_config().await
    }

    /// The persisted retention config.
    pub async fn get_config(&self) -> AppResult<RetentionConfig> {
        self.config_repo.get_config().await
    }

    /// Run a cleanup pass now, optionally with a different retention window.
    pub async fn trigger_cleanup(&self, retention_days: Option<i64>) -> OperationOutcome {
        self.retention.manual_cleanup(retention_days).await
    }

    /// Scan one service now.
    pub async fn trigger_scan(&self, service_name: &str) -> OperationOutcome {
        self.scanner.scan_service_now(service_name).await
    }

    /// Jobs currently registered with the scheduler.
    pub async fn registered_jobs(&self) -> Vec<RegisteredJob> {
        self.inner.lock().await.jobs.clone()
    }

    /// When the cleanup job fires next, if it is registered.
    pub async fn next_cleanup_run(&self) -> Option<DateTime<Utc>> {
        let inner = self.inner.lock().await;
        let scheduler = inner.scheduler.as_ref()?;
        let job = inner.jobs.iter().find(|j| j.kind == JobKind::Cleanup)?;
        scheduler.next_fire_time(job.id).await
    }

    /// When scheduler job `id` fires next. `None` once the job is removed.
    pub async fn next_fire_time(&self, id: Uuid) -> Option<DateTime<Utc>> {
        let inner = self.inner.lock().await;
        inner.scheduler.as_ref()?.next_fire_time(id).await
    }

    /// Remove all jobs and stop the scheduler.
    pub async fn shutdown(&self) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        self.stop_jobs(&mut inner).await;

        if let Some(scheduler) = inner.scheduler.take() {
            scheduler.shutdown().await?;
        }
        if let Err(e) = self.config_repo.set_next_run(None).await {
            tracing::warn!(error = %e, "Failed to clear next run on shutdown");
        }

        tracing::info!("Schedule controller stopped");
        Ok(())
    }

    async fn bootstrap(&self, inner: &mut Inner) -> AppResult<()> {
        let scheduler = CronScheduler::new().await?;
        scheduler.start().await?;
        inner.scheduler = Some(scheduler);

        let config = self.config_repo.get_config().await?;
        self.apply(inner, &config).await
    }

    /// Replace whatever is registered with what `config` asks for.
    async fn apply(&self, inner: &mut Inner, config: &RetentionConfig) -> AppResult<()> {
        self.stop_jobs(inner).await;

        if !config.enabled {
            self.config_repo.set_next_run(None).await?;
            tracing::info!("Retention disabled; scan and cleanup jobs not scheduled");
            return Ok(());
        }

        let scheduler = inner
            .scheduler
            .as_ref()
            .ok_or_else(|| AppError::scheduler("Scheduler is not running"))?;
        let expr = cron::validate(&config.schedule)?;

        let cleanup_id = scheduler
            .add_cron(&expr, Arc::clone(&self.cleanup_job))
            .await?;
        inner.jobs.push(RegisteredJob {
            id: cleanup_id,
            kind: JobKind::Cleanup,
            schedule: expr,
        });

        let scan_id = scheduler
            .add_repeated(SCAN_INTERVAL, Arc::clone(&self.scan_job))
            .await?;
        inner.jobs.push(RegisteredJob {
            id: scan_id,
            kind: JobKind::Scan,
            schedule: format!("every {}s", SCAN_INTERVAL.as_secs()),
        });

        inner.state = ControllerState::Running;

        let next = scheduler.next_fire_time(cleanup_id).await;
        self.config_repo.set_next_run(next).await?;
        Ok(())
    }

    async fn stop_jobs(&self, inner: &mut Inner) {
        if let Some(scheduler) = &inner.scheduler {
            for job in inner.jobs.drain(..) {
                if let Err(e) = scheduler.remove(&job.id).await {
                    tracing::warn!(job = %job.id, error = %e, "Failed to remove job");
                }
            }
        } else {
            inner.jobs.clear();
        }
        inner.state = ControllerState::Stopped;
    }
}

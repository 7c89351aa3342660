//! Scheduled retention cleanup.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use logvault_database::repositories::RetentionConfigRepository;
use logvault_service::RetentionManager;

use crate::executor::{JobExecutionError, JobHandler};
use crate::scheduler::JobContext;

/// Applies the persisted retention window, then records `lastRun`/`nextRun`.
#[derive(Debug)]
pub struct RetentionCleanupJob {
    manager: RetentionManager,
    config_repo: Arc<RetentionConfigRepository>,
}

impl RetentionCleanupJob {
    /// Create a cleanup job.
    pub fn new(manager: RetentionManager, config_repo: Arc<RetentionConfigRepository>) -> Self {
        Self {
            manager,
            config_repo,
        }
    }
}

#[async_trait]
impl JobHandler for RetentionCleanupJob {
    fn job_type(&self) -> &str {
        "retention_cleanup"
    }

    async fn execute(&self, ctx: &JobContext) -> Result<Value, JobExecutionError> {
        let config = self.config_repo.get_config().await.map_err(|e| {
            JobExecutionError::Transient(format!("Failed to load retention config: {e}"))
        })?;

        let result = self.manager.cleanup(config.retention_days).await;

        // lastRun/nextRun are recorded even when the pass itself failed.
        self.config_repo.set_last_run(Utc::now()).await?;
        self.config_repo
            .set_next_run(ctx.next_fire_time().await)
            .await?;

        let summary = result
            .map_err(|e| JobExecutionError::Transient(format!("Cleanup pass failed: {e}")))?;
        serde_json::to_value(&summary).map_err(|e| JobExecutionError::Internal(e.into()))
    }
}

//! Retention config repository implementation.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use logvault_core::error::{AppError, ErrorKind};
use logvault_core::result::AppResult;
use logvault_entity::retention::{RetentionConfig, UpdateRetentionConfig};

/// Repository for the singleton `retention_config` row.
#[derive(Debug, Clone)]
pub struct RetentionConfigRepository {
    pool: SqlitePool,
}

impl RetentionConfigRepository {
    /// Create a new retention config repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Return the config, creating it with defaults on first access.
    pub async fn get_config(&self) -> AppResult<RetentionConfig> {
        self.ensure_exists().await?;

        sqlx::query_as::<_, RetentionConfig>(
            "SELECT enabled, retention_days, schedule, last_run, next_run \
             FROM retention_config WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load retention config", e)
        })
    }

    /// Replace enabled/retention/schedule in one statement.
    pub async fn update_config(&self, data: &UpdateRetentionConfig) -> AppResult<RetentionConfig> {
        self.ensure_exists().await?;

        sqlx::query(
            "UPDATE retention_config SET enabled = ?, retention_days = ?, schedule = ?, updated_at = ? \
             WHERE id = 1",
        )
        .bind(data.enabled)
        .bind(data.retention_days)
        .bind(&data.schedule)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update retention config", e)
        })?;

        self.get_config().await
    }

    /// Record when the cleanup job last ran.
    pub async fn set_last_run(&self, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE retention_config SET last_run = ?, updated_at = ? WHERE id = 1")
            .bind(at)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record last run", e))?;
        Ok(())
    }

    /// Record when the cleanup job fires next (`None` while stopped).
    pub async fn set_next_run(&self, at: Option<DateTime<Utc>>) -> AppResult<()> {
        sqlx::query("UPDATE retention_config SET next_run = ?, updated_at = ? WHERE id = 1")
            .bind(at)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record next run", e))?;
        Ok(())
    }

    async fn ensure_exists(&self) -> AppResult<()> {
        let defaults = RetentionConfig::default();
        sqlx::query(
            "INSERT OR IGNORE INTO retention_config (id, enabled, retention_days, schedule, updated_at) \
             VALUES (1, ?, ?, ?, ?)",
        )
        .bind(defaults.enabled)
        .bind(defaults.retention_days)
        .bind(&defaults.schedule)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to seed retention config", e)
        })?;
        Ok(())
    }
}

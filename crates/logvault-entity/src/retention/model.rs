//! Retention configuration entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Retention window used when the config row is first created.
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

/// Cleanup schedule used when the config row is first created (daily 02:00 UTC).
pub const DEFAULT_SCHEDULE: &str = "0 0 2 * * *";

/// The singleton retention config row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RetentionConfig {
    /// Whether the scan and cleanup jobs run.
    pub enabled: bool,
    /// Days a file stays indexed before cleanup acts on it.
    pub retention_days: i64,
    /// Cron expression for the cleanup job.
    pub schedule: String,
    /// When the cleanup job last completed.
    pub last_run: Option<DateTime<Utc>>,
    /// When the cleanup job fires next.
    pub next_run: Option<DateTime<Utc>>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_days: DEFAULT_RETENTION_DAYS,
            schedule: DEFAULT_SCHEDULE.to_string(),
            last_run: None,
            next_run: None,
        }
    }
}

/// New values for the mutable part of the retention config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRetentionConfig {
    /// Whether the scan and cleanup jobs run.
    pub enabled: bool,
    /// Retention window in days.
    #[validate(range(min = 1, max = 3650, message = "retentionDays must be between 1 and 3650"))]
    pub retention_days: i64,
    /// Cron expression for the cleanup job.
    #[validate(length(min = 1, message = "schedule is required"))]
    pub schedule: String,
}

//! Retention enforcement.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use logvault_core::config::RetentionSettings;
use logvault_core::error::AppError;
use logvault_core::result::AppResult;
use logvault_database::IndexStore;
use logvault_database::repositories::{
    LogEntryRepository, LogFileRepository, RetentionConfigRepository,
};
use logvault_entity::log_file::LogFile;

use super::archive;
use crate::outcome::OperationOutcome;

/// What one cleanup pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupSummary {
    /// Files dated strictly before this day were eligible.
    pub cutoff_date: NaiveDate,
    /// Non-archived files older than the cutoff.
    pub files_considered: usize,
    /// Physical files compressed into `archived/`.
    pub archived: usize,
    /// Physical files deleted outright.
    pub deleted: usize,
    /// Files already gone from disk; only their index rows were retired.
    pub missing: usize,
    /// Files skipped because of an error.
    pub failed: usize,
    /// Entries removed from the index.
    pub entries_purged: u64,
}

impl CleanupSummary {
    fn new(cutoff_date: NaiveDate) -> Self {
        Self {
            cutoff_date,
            files_considered: 0,
            archived: 0,
            deleted: 0,
            missing: 0,
            failed: 0,
            entries_purged: 0,
        }
    }
}

enum Disposal {
    Archived,
    Deleted,
    Missing,
}

/// Archives or deletes log files older than the retention window.
#[derive(Debug, Clone)]
pub struct RetentionManager {
    files: Arc<LogFileRepository>,
    entries: Arc<LogEntryRepository>,
    config: Arc<RetentionConfigRepository>,
    archive_enabled: bool,
    keep_archived_records: bool,
}

impl RetentionManager {
    /// Create a manager. The archival toggle is fixed for its lifetime.
    pub fn new(store: &IndexStore, settings: &RetentionSettings) -> Self {
        Self {
            files: Arc::clone(&store.files),
            entries: Arc::clone(&store.entries),
            config: Arc::clone(&store.config),
            archive_enabled: settings.archive_enabled,
            keep_archived_records: settings.keep_archived_records,
        }
    }

    /// Whether expired files are compressed rather than deleted.
    pub fn archive_enabled(&self) -> bool {
        self.archive_enabled
    }

    /// Run a cleanup pass against today's date (UTC).
    pub async fn cleanup(&self, retention_days: i64) -> AppResult<CleanupSummary> {
        self.cleanup_as_of(retention_days, Utc::now().date_naive())
            .await
    }

    /// Run a cleanup pass with `today` as the reference date.
    ///
    /// Only a failure to list candidates is returned; per-file failures are
    /// logged and counted in [`CleanupSummary::failed`].
    pub async fn cleanup_as_of(
        &self,
        retention_days: i64,
        today: NaiveDate,
    ) -> AppResult<CleanupSummary> {
        let cutoff = cutoff_date(retention_days, today)?;
        let candidates = self.files.files_older_than(cutoff, false).await?;

        let mut summary = CleanupSummary::new(cutoff);
        summary.files_considered = candidates.len();

        for file in &candidates {
            match self.retire(file, cutoff).await {
                Ok((disposal, purged)) => {
                    summary.entries_purged += purged;
                    match disposal {
                        Disposal::Archived => summary.archived += 1,
                        Disposal::Deleted => summary.deleted += 1,
                        Disposal::Missing => summary.missing += 1,
                    }
                }
                Err(e) => {
                    error!(path = %file.path, error = %e, "Failed to retire log file");
                    summary.failed += 1;
                }
            }
        }

        info!(
            cutoff = %cutoff,
            considered = summary.files_considered,
            archived = summary.archived,
            deleted = summary.deleted,
            missing = summary.missing,
            failed = summary.failed,
            entries = summary.entries_purged,
            "Retention cleanup completed"
        );
        Ok(summary)
    }

    /// Manual trigger. Falls back to the persisted retention window when no
    /// override is given. Never returns an error.
    pub async fn manual_cleanup(&self, retention_days: Option<i64>) -> OperationOutcome {
        let days = match retention_days {
            Some(days) => days,
            None => match self.config.get_config().await {
                Ok(config) => config.retention_days,
                Err(e) => {
                    return OperationOutcome::failure(format!(
                        "Failed to load retention config: {e}"
                    ));
                }
            },
        };

        match self.cleanup(days).await {
            Ok(summary) => OperationOutcome::ok(format!(
                "Cleanup before {}: {} archived, {} deleted, {} missing, {} failed, {} entries purged",
                summary.cutoff_date,
                summary.archived,
                summary.deleted,
                summary.missing,
                summary.failed,
                summary.entries_purged
            )),
            Err(e) => OperationOutcome::failure(format!("Cleanup failed: {e}")),
        }
    }

    async fn retire(&self, file: &LogFile, cutoff: NaiveDate) -> AppResult<(Disposal, u64)> {
        let path = file.as_path();

        let disposal = if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            warn!(path = %file.path, "Expired log file no longer on disk");
            Disposal::Missing
        } else if self.archive_enabled {
            let target = archive::archive_file(path).await?;
            debug!(path = %file.path, archive = %target.display(), "Archived log file");
            Disposal::Archived
        } else {
            tokio::fs::remove_file(path).await?;
            debug!(path = %file.path, "Deleted log file");
            Disposal::Deleted
        };

        self.files.mark_archived(file.id).await?;
        let purged = self.entries.purge_entries_before(file.id, cutoff).await?;

        if !self.keep_archived_records {
            self.files.delete_file(file.id).await?;
        }

        Ok((disposal, purged))
    }
}

/// `today - retention_days`; files dated strictly before it expire.
pub fn cutoff_date(retention_days: i64, today: NaiveDate) -> AppResult<NaiveDate> {
    let days = u64::try_from(retention_days)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| {
            AppError::validation(format!(
                "retention days must be at least 1, got {retention_days}"
            ))
        })?;

    today
        .checked_sub_days(Days::new(days))
        .ok_or_else(|| AppError::validation(format!("retention days {retention_days} out of range")))
}

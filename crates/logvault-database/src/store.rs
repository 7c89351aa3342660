//! The index store: the three repositories sharing one pool.

use std::sync::Arc;

use crate::connection::DatabasePool;
use crate::repositories::{LogEntryRepository, LogFileRepository, RetentionConfigRepository};

/// Handle to every table of the index store.
///
/// Cheap to clone; constructed once by the entry point and passed to the
/// scanner, the retention manager, and the schedule controller.
#[derive(Debug, Clone)]
pub struct IndexStore {
    /// `log_files` accessors.
    pub files: Arc<LogFileRepository>,
    /// `log_entries` accessors.
    pub entries: Arc<LogEntryRepository>,
    /// `retention_config` accessors.
    pub config: Arc<RetentionConfigRepository>,
}

impl IndexStore {
    /// Build the repositories over a connected pool.
    pub fn new(db: &DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            files: Arc::new(LogFileRepository::new(pool.clone())),
            entries: Arc::new(LogEntryRepository::new(pool.clone())),
            config: Arc::new(RetentionConfigRepository::new(pool)),
        }
    }

    /// Open an in-memory store with migrations applied.
    pub async fn in_memory() -> logvault_core::AppResult<Self> {
        let db = DatabasePool::in_memory().await?;
        crate::migration::run_migrations(db.pool()).await?;
        Ok(Self::new(&db))
    }
}

//! Log file repository implementation.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use logvault_core::error::{AppError, ErrorKind};
use logvault_core::result::AppResult;
use logvault_core::types::pagination::{PageRequest, PageResponse};
use logvault_entity::log_file::{FileId, FileStat, LogFile};

const FILE_COLUMNS: &str = "id, path, service_name, file_name, size_bytes, created_date, \
     modified_at, archived, indexed_at";

/// Repository for `log_files` rows.
#[derive(Debug, Clone)]
pub struct LogFileRepository {
    pool: SqlitePool,
}

impl LogFileRepository {
    /// Create a new log file repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a file by its absolute path.
    pub async fn find_by_path(&self, path: &str) -> AppResult<Option<LogFile>> {
        sqlx::query_as::<_, LogFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM log_files WHERE path = ?"
        ))
        .bind(path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find log file", e))
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, id: FileId) -> AppResult<Option<LogFile>> {
        sqlx::query_as::<_, LogFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM log_files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find log file", e))
    }

    /// Insert a row for `path` if none exists and return its ID.
    ///
    /// An existing row is returned untouched; size and modification time are
    /// only written by [`record_indexed`](Self::record_indexed).
    pub async fn upsert_file(&self, path: &str, service_name: &str) -> AppResult<FileId> {
        let file_name = std::path::Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        sqlx::query(
            "INSERT INTO log_files (path, service_name, file_name, size_bytes, created_date, modified_at, archived) \
             VALUES (?, ?, ?, 0, ?, ?, 0) \
             ON CONFLICT (path) DO NOTHING",
        )
        .bind(path)
        .bind(service_name)
        .bind(&file_name)
        .bind(Utc::now().date_naive())
        .bind(DateTime::<Utc>::UNIX_EPOCH)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert log file", e))?;

        sqlx::query_scalar::<_, FileId>("SELECT id FROM log_files WHERE path = ?")
            .bind(path)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read log file id", e))
    }

    /// Update the descriptive columns derived from the path and filesystem.
    pub async fn update_details(
        &self,
        id: FileId,
        service_name: &str,
        file_name: &str,
        created_date: NaiveDate,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE log_files SET service_name = ?, file_name = ?, created_date = ? WHERE id = ?",
        )
        .bind(service_name)
        .bind(file_name)
        .bind(created_date)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update log file details", e)
        })?;
        Ok(())
    }

    /// Store the stat the entries were just rebuilt from.
    pub async fn record_indexed(&self, id: FileId, stat: &FileStat) -> AppResult<()> {
        sqlx::query(
            "UPDATE log_files SET size_bytes = ?, modified_at = ?, indexed_at = ? WHERE id = ?",
        )
        .bind(stat.size_bytes)
        .bind(stat.modified_at)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record indexed stat", e)
        })?;
        Ok(())
    }

    /// Files whose `created_date` is strictly before `cutoff`.
    pub async fn files_older_than(
        &self,
        cutoff: NaiveDate,
        include_archived: bool,
    ) -> AppResult<Vec<LogFile>> {
        let sql = if include_archived {
            format!("SELECT {FILE_COLUMNS} FROM log_files WHERE created_date < ?")
        } else {
            format!("SELECT {FILE_COLUMNS} FROM log_files WHERE created_date < ? AND archived = 0")
        };

        sqlx::query_as::<_, LogFile>(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to query expired log files", e)
            })
    }

    /// Flag a file as archived.
    pub async fn mark_archived(&self, id: FileId) -> AppResult<()> {
        let result = sqlx::query("UPDATE log_files SET archived = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark log file archived", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Log file {id} not found")));
        }
        Ok(())
    }

    /// Delete a file row together with its entries.
    pub async fn delete_file(&self, id: FileId) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("DELETE FROM log_entries WHERE file_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete entries", e))?;

        sqlx::query("DELETE FROM log_files WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete log file", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }

    /// List a service's files, newest first.
    pub async fn find_by_service(
        &self,
        service_name: &str,
        include_archived: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<LogFile>> {
        let archived_clause = if include_archived { "" } else { " AND archived = 0" };

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM log_files WHERE service_name = ?{archived_clause}"
        ))
        .bind(service_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count log files", e))?;

        let files = sqlx::query_as::<_, LogFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM log_files WHERE service_name = ?{archived_clause} \
             ORDER BY created_date DESC, path ASC LIMIT ? OFFSET ?"
        ))
        .bind(service_name)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list log files", e))?;

        Ok(PageResponse::new(files, page, total as u64))
    }

    /// Distinct service names that have at least one file.
    pub async fn list_services(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT service_name FROM log_files ORDER BY service_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list services", e))
    }

    /// Count files, optionally including archived ones.
    pub async fn count(&self, include_archived: bool) -> AppResult<i64> {
        let sql = if include_archived {
            "SELECT COUNT(*) FROM log_files"
        } else {
            "SELECT COUNT(*) FROM log_files WHERE archived = 0"
        };
        sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count log files", e))
    }
}

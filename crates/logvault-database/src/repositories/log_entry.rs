//! Log entry repository implementation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};

use logvault_core::error::{AppError, ErrorKind};
use logvault_core::result::AppResult;
use logvault_core::types::pagination::{PageRequest, PageResponse};
use logvault_entity::log_entry::{LogEntry, LogLevel, NewLogEntry};
use logvault_entity::log_file::FileId;

/// Rows per multi-row INSERT; 7 binds each keeps well under SQLite's variable limit.
const INSERT_CHUNK: usize = 500;

const ENTRY_COLUMNS: &str =
    "e.id, e.file_id, e.timestamp, e.level, e.message, e.metadata, e.stack_trace, e.line_number";

/// Filters for the entry query surface. Unset fields do not constrain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryQuery {
    /// Only entries of files owned by this service.
    pub service: Option<String>,
    /// Only entries at this level.
    pub level: Option<LogLevel>,
    /// Only entries of this file.
    pub file_id: Option<FileId>,
    /// Inclusive lower bound on the entry timestamp.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the entry timestamp.
    pub to: Option<DateTime<Utc>>,
}

/// Repository for `log_entries` rows.
#[derive(Debug, Clone)]
pub struct LogEntryRepository {
    pool: SqlitePool,
}

impl LogEntryRepository {
    /// Create a new log entry repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Delete every entry of `file_id` and insert `entries` in one transaction.
    ///
    /// Readers observe either the old set or the new set, never a mix.
    pub async fn replace_entries(&self, file_id: FileId, entries: &[NewLogEntry]) -> AppResult<u64> {
        let mut tx = self.begin().await?;

        sqlx::query("DELETE FROM log_entries WHERE file_id = ?")
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear log entries", e)
            })?;

        let inserted = insert_chunked(&mut tx, file_id, entries).await?;
        commit(tx).await?;
        Ok(inserted)
    }

    /// Insert `entries` for `file_id` in one transaction without clearing.
    pub async fn append_entries(&self, file_id: FileId, entries: &[NewLogEntry]) -> AppResult<u64> {
        let mut tx = self.begin().await?;
        let inserted = insert_chunked(&mut tx, file_id, entries).await?;
        commit(tx).await?;
        Ok(inserted)
    }

    /// Delete every entry of a file.
    pub async fn purge_entries_for_file(&self, file_id: FileId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM log_entries WHERE file_id = ?")
            .bind(file_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge log entries", e)
            })?;
        Ok(result.rows_affected())
    }

    /// Delete a file's entries only while that file is dated before `cutoff`.
    ///
    /// Scoped to one file so a concurrent re-index of a file that no longer
    /// qualifies is left alone.
    pub async fn purge_entries_before(&self, file_id: FileId, cutoff: NaiveDate) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM log_entries WHERE file_id = ? \
             AND file_id IN (SELECT id FROM log_files WHERE id = ? AND created_date < ?)",
        )
        .bind(file_id)
        .bind(file_id)
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge log entries", e))?;
        Ok(result.rows_affected())
    }

    /// All entries of a file in line order.
    pub async fn find_by_file(&self, file_id: FileId) -> AppResult<Vec<LogEntry>> {
        sqlx::query_as::<_, LogEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM log_entries e WHERE e.file_id = ? ORDER BY e.line_number"
        ))
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list log entries", e))
    }

    /// Number of entries stored for a file.
    pub async fn count_for_file(&self, file_id: FileId) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM log_entries WHERE file_id = ?")
            .bind(file_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count entries", e))
    }

    /// Number of entries in the store.
    pub async fn count_all(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM log_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count entries", e))
    }

    /// Search entries, newest first; ties broken by file and line order.
    pub async fn search(
        &self,
        query: &EntryQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<LogEntry>> {
        let mut count = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM log_entries e JOIN log_files f ON f.id = e.file_id",
        );
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count search results", e)
            })?;

        let mut select = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {ENTRY_COLUMNS} FROM log_entries e JOIN log_files f ON f.id = e.file_id"
        ));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY e.timestamp DESC, e.file_id ASC, e.line_number ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let entries = select
            .build_query_as::<LogEntry>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search entries", e))?;

        Ok(PageResponse::new(entries, page, total as u64))
    }

    /// Entry counts per level, optionally for one service. Levels with no
    /// entries are reported as zero.
    pub async fn count_by_level(&self, service: Option<&str>) -> AppResult<Vec<(LogLevel, i64)>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT e.level, COUNT(*) FROM log_entries e JOIN log_files f ON f.id = e.file_id",
        );
        if let Some(service) = service {
            builder.push(" WHERE f.service_name = ").push_bind(service);
        }
        builder.push(" GROUP BY e.level");

        let rows: Vec<(LogLevel, i64)> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count levels", e))?;

        Ok(LogLevel::ALL
            .iter()
            .map(|level| {
                let count = rows
                    .iter()
                    .find(|(l, _)| l == level)
                    .map(|(_, c)| *c)
                    .unwrap_or(0);
                (*level, count)
            })
            .collect())
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }
}

async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))
}

async fn insert_chunked(
    tx: &mut Transaction<'static, Sqlite>,
    file_id: FileId,
    entries: &[NewLogEntry],
) -> AppResult<u64> {
    let mut inserted = 0;

    for chunk in entries.chunks(INSERT_CHUNK) {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO log_entries (file_id, timestamp, level, message, metadata, stack_trace, line_number) ",
        );
        builder.push_values(chunk, |mut row, entry| {
            row.push_bind(file_id)
                .push_bind(entry.timestamp)
                .push_bind(entry.level)
                .push_bind(entry.message.clone())
                .push_bind(entry.metadata.as_ref().map(|m| m.to_string()))
                .push_bind(entry.stack_trace.clone())
                .push_bind(entry.line_number);
        });

        let result = builder.build().execute(&mut **tx).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert log entries", e)
        })?;
        inserted += result.rows_affected();
    }

    Ok(inserted)
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, query: &'a EntryQuery) {
    let mut sep = " WHERE ";
    if let Some(service) = &query.service {
        builder.push(sep).push("f.service_name = ").push_bind(service.as_str());
        sep = " AND ";
    }
    if let Some(level) = query.level {
        builder.push(sep).push("e.level = ").push_bind(level);
        sep = " AND ";
    }
    if let Some(file_id) = query.file_id {
        builder.push(sep).push("e.file_id = ").push_bind(file_id);
        sep = " AND ";
    }
    if let Some(from) = query.from {
        builder.push(sep).push("e.timestamp >= ").push_bind(from);
        sep = " AND ";
    }
    if let Some(to) = query.to {
        builder.push(sep).push("e.timestamp < ").push_bind(to);
    }
}

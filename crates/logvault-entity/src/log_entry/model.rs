//! Log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::level::LogLevel;
use crate::log_file::FileId;

/// One parsed line of an indexed log file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Row identifier.
    pub id: i64,
    /// Owning `log_files` row.
    pub file_id: FileId,
    /// Entry timestamp (parse time when the line carried none).
    pub timestamp: DateTime<Utc>,
    /// Normalized severity.
    pub level: LogLevel,
    /// Message text; never empty.
    pub message: String,
    /// Producer-specific structured payload, stored as-is.
    pub metadata: Option<serde_json::Value>,
    /// Stack trace text, when the producer attached one.
    pub stack_trace: Option<String>,
    /// 1-based line number in the source file.
    pub line_number: i64,
}

/// A parsed line ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLogEntry {
    /// Entry timestamp.
    pub timestamp: DateTime<Utc>,
    /// Normalized severity.
    pub level: LogLevel,
    /// Message text.
    pub message: String,
    /// Optional structured payload.
    pub metadata: Option<serde_json::Value>,
    /// Optional stack trace.
    pub stack_trace: Option<String>,
    /// 1-based line number.
    pub line_number: i64,
}

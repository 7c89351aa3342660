//! Log file entity model.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Primary key of a `log_files` row.
pub type FileId = i64;

/// One physical log file observed by the scanner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LogFile {
    /// Row identifier.
    pub id: FileId,
    /// Absolute path; unique across the table.
    pub path: String,
    /// Owning service.
    pub service_name: String,
    /// Final path component.
    pub file_name: String,
    /// Size in bytes at the last successful index.
    pub size_bytes: i64,
    /// Date the file's content belongs to (from the file name, else birth time).
    pub created_date: NaiveDate,
    /// Filesystem modification time at the last successful index.
    pub modified_at: DateTime<Utc>,
    /// Set once retention has archived or deleted the physical file.
    pub archived: bool,
    /// When the entries were last rebuilt.
    pub indexed_at: Option<DateTime<Utc>>,
}

impl LogFile {
    /// Whether the on-disk stat differs from what was last indexed.
    ///
    /// A file is changed when its size differs or the stored modification
    /// time is strictly older than the current one.
    pub fn is_changed(&self, stat: &FileStat) -> bool {
        self.size_bytes != stat.size_bytes || self.modified_at < stat.modified_at
    }

    /// Path as a [`Path`].
    pub fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }
}

/// Size and modification time of a file as read from the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes.
    pub size_bytes: i64,
    /// Modification time, truncated to milliseconds.
    pub modified_at: DateTime<Utc>,
}

//! Request DTOs and query strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use logvault_core::result::AppResult;
use logvault_core::types::pagination::PageRequest;
use logvault_database::repositories::EntryQuery;
use logvault_entity::log_entry::LogLevel;
use logvault_entity::log_file::FileId;

use crate::extractors::page_request;

/// Body of `POST /logs/cleanup`; an empty body uses the persisted window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    /// Override for the retention window in days.
    pub retention_days: Option<i64>,
}

/// Query string of `GET /logs/files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListQuery {
    /// Owning service.
    pub service: String,
    /// Include files already retired by retention.
    #[serde(default)]
    pub include_archived: bool,
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Items per page.
    pub page_size: Option<u64>,
}

impl FileListQuery {
    /// Requested page window.
    pub fn page(&self) -> PageRequest {
        page_request(self.page, self.page_size)
    }
}

/// Query string of `GET /logs/entries`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySearchQuery {
    /// Owning service.
    pub service: Option<String>,
    /// One of `error`, `warn`, `info`, `debug`.
    pub level: Option<String>,
    /// Single file.
    pub file_id: Option<FileId>,
    /// Inclusive lower bound (RFC 3339).
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound (RFC 3339).
    pub to: Option<DateTime<Utc>>,
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Items per page.
    pub page_size: Option<u64>,
}

impl EntrySearchQuery {
    /// Split into repository filters and a page window.
    ///
    /// Unknown level names are a validation error rather than a silent match-all.
    pub fn into_parts(self) -> AppResult<(EntryQuery, PageRequest)> {
        let level = self.level.as_deref().map(str::parse::<LogLevel>).transpose()?;
        let page = page_request(self.page, self.page_size);
        let query = EntryQuery {
            service: self.service,
            level,
            file_id: self.file_id,
            from: self.from,
            to: self.to,
        };
        Ok((query, page))
    }
}

/// Query string of `GET /logs/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    /// Restrict level counts to one service.
    pub service: Option<String>,
}

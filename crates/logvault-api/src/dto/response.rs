//! Response DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use logvault_worker::ControllerState;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Database connectivity.
    pub database: String,
    /// Schedule controller lifecycle state.
    pub scheduler: ControllerState,
}

/// Index store totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Services with at least one indexed file.
    pub services: Vec<String>,
    /// Files still in the active index.
    pub active_files: i64,
    /// Files including those retired by retention.
    pub total_files: i64,
    /// Entries in the index.
    pub entries: i64,
    /// Entry count per level (all four levels present).
    pub levels: BTreeMap<String, i64>,
}

//! Read-only queries over the index store.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};

use logvault_core::types::pagination::PageResponse;
use logvault_entity::log_entry::LogEntry;
use logvault_entity::log_file::LogFile;

use crate::dto::request::{EntrySearchQuery, FileListQuery, StatsQuery};
use crate::dto::response::{ApiResponse, StatsResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/logs/files
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<FileListQuery>,
) -> Result<Json<ApiResponse<PageResponse<LogFile>>>, ApiError> {
    let page = state
        .store
        .files
        .find_by_service(&query.service, query.include_archived, &query.page())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/logs/entries
pub async fn search_entries(
    State(state): State<AppState>,
    Query(query): Query<EntrySearchQuery>,
) -> Result<Json<ApiResponse<PageResponse<LogEntry>>>, ApiError> {
    let (filters, page) = query.into_parts()?;
    let result = state.store.entries.search(&filters, &page).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/logs/stats
pub async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<StatsResponse>>, ApiError> {
    let services = state.store.files.list_services().await?;
    let active_files = state.store.files.count(false).await?;
    let total_files = state.store.files.count(true).await?;
    let counts = state
        .store
        .entries
        .count_by_level(query.service.as_deref())
        .await?;

    let entries: i64 = counts.iter().map(|(_, n)| n).sum();
    let levels: BTreeMap<String, i64> = counts
        .into_iter()
        .map(|(level, n)| (level.to_string(), n))
        .collect();

    Ok(Json(ApiResponse::ok(StatsResponse {
        services,
        active_files,
        total_files,
        entries,
        levels,
    })))
}

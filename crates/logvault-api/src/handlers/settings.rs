//! Retention settings and manual trigger handlers.
//!
//! These return the bare config/outcome shapes consumed by the admin UI
//! rather than the `ApiResponse` wrapper.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};

use logvault_core::error::AppError;
use logvault_entity::retention::{RetentionConfig, UpdateRetentionConfig};
use logvault_service::OperationOutcome;

use crate::dto::request::CleanupRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/logs/config
pub async fn get_config(State(state): State<AppState>) -> Result<Json<RetentionConfig>, ApiError> {
    let config = state.controller.get_config().await?;
    Ok(Json(config))
}

/// PUT /api/logs/config
pub async fn update_config(
    State(state): State<AppState>,
    Json(req): Json<UpdateRetentionConfig>,
) -> Result<Json<RetentionConfig>, ApiError> {
    tracing::info!(
        enabled = req.enabled,
        retention_days = req.retention_days,
        schedule = %req.schedule,
        "Retention config update requested"
    );
    let config = state.controller.update_config(req).await?;
    Ok(Json(config))
}

/// POST /api/logs/cleanup
///
/// The body is optional; `{"retentionDays": n}` overrides the persisted window.
pub async fn run_cleanup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OperationOutcome>, ApiError> {
    let req: CleanupRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CleanupRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid cleanup request: {e}")))?
    };

    Ok(Json(state.controller.trigger_cleanup(req.retention_days).await))
}

/// POST /api/logs/scan/{service}
pub async fn run_scan(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> Json<OperationOutcome> {
    Json(state.controller.trigger_scan(&service).await)
}

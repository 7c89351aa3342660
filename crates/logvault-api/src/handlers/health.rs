//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database_ok = state.db.health_check().await.unwrap_or(false);

    Json(ApiResponse::ok(HealthResponse {
        status: if database_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_ok { "connected" } else { "unavailable" }.to_string(),
        scheduler: state.controller.state().await,
    }))
}

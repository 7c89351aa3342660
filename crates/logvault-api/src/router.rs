//! Route definitions for the LogVault HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(settings_routes())
        .merge(query_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Retention config and manual triggers
fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/logs/config",
            get(handlers::settings::get_config).put(handlers::settings::update_config),
        )
        .route("/logs/cleanup", post(handlers::settings::run_cleanup))
        .route("/logs/scan/{service}", post(handlers::settings::run_scan))
}

/// Index store queries
fn query_routes() -> Router<AppState> {
    Router::new()
        .route("/logs/files", get(handlers::query::list_files))
        .route("/logs/entries", get(handlers::query::search_entries))
        .route("/logs/stats", get(handlers::query::stats))
}

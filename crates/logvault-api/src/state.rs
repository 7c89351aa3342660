//! Application state shared across all handlers.

use std::sync::Arc;

use logvault_core::config::AppConfig;
use logvault_database::{DatabasePool, IndexStore};
use logvault_worker::ScheduleController;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// SQLite connection pool
    pub db: DatabasePool,
    /// Index store repositories
    pub store: IndexStore,
    /// Owner of the scan and cleanup jobs
    pub controller: Arc<ScheduleController>,
}

impl AppState {
    /// Bundle the shared dependencies.
    pub fn new(
        config: Arc<AppConfig>,
        db: DatabasePool,
        store: IndexStore,
        controller: Arc<ScheduleController>,
    ) -> Self {
        Self {
            config,
            db,
            store,
            controller,
        }
    }
}

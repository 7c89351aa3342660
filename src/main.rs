//! LogVault Server: log scanning, indexing, and retention.
//!
//! Main entry point that wires all crates together and starts the server.

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use logvault_core::config::AppConfig;
use logvault_core::error::AppError;
use logvault_database::{DatabasePool, IndexStore};
use logvault_service::{LogScanner, RetentionManager};
use logvault_worker::ScheduleController;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `LOGVAULT_ENV` overlay, and `LOGVAULT__*` variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("LOGVAULT_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting LogVault v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Create data directories ──────────────────────────
    create_data_directories(&config).await?;

    // ── Step 2: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;
    logvault_database::migration::run_migrations(db.pool()).await?;
    let store = IndexStore::new(&db);

    let retention_config = store.config.get_config().await?;
    tracing::info!(
        enabled = retention_config.enabled,
        retention_days = retention_config.retention_days,
        schedule = %retention_config.schedule,
        "Retention config loaded"
    );

    // ── Step 3: Scanner and retention manager ────────────────────
    let scanner = LogScanner::new(&store, config.scanner.clone());
    let services = scanner.services();
    if services.is_empty() {
        tracing::warn!("No service log directories configured");
    }
    for service in &services {
        tracing::info!(service = %service.name, path = %service.path.display(), "Watching service logs");
    }

    let retention = RetentionManager::new(&store, &config.retention);
    tracing::info!(
        archive_enabled = retention.archive_enabled(),
        keep_records = config.retention.keep_archived_records,
        "Retention manager ready"
    );

    // ── Step 4: Schedule controller ──────────────────────────────
    let controller = Arc::new(ScheduleController::new(&store, scanner, retention));
    if config.scheduler.enabled {
        controller.initialize().await?;
    } else {
        tracing::info!("Schedule controller disabled by configuration");
    }

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app_state = logvault_api::AppState::new(
        Arc::new(config.clone()),
        db.clone(),
        store,
        Arc::clone(&controller),
    );
    let app = logvault_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("LogVault server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let shutdown_controller = Arc::clone(&controller);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, stopping scheduled jobs...");
            if let Err(e) = shutdown_controller.shutdown().await {
                tracing::warn!("Schedule controller shutdown failed: {}", e);
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    tracing::info!("LogVault server shut down gracefully");
    Ok(())
}

/// Create the SQLite file's parent directory
async fn create_data_directories(config: &AppConfig) -> Result<(), AppError> {
    if config.database.is_in_memory() {
        return Ok(());
    }

    let path = config
        .database
        .url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);

    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::internal(format!("Failed to create dir '{}': {}", dir.display(), e))
        })?;
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

//! Shared test helpers for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use filetime::FileTime;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use logvault_core::config::{AppConfig, RetentionSettings, ScannerConfig};
use logvault_database::{DatabasePool, IndexStore};
use logvault_entity::log_file::LogFile;
use logvault_service::{LogScanner, RetentionManager};
use logvault_worker::ScheduleController;

/// Scratch log root plus an in-memory index store.
pub struct TestEnv {
    /// Holds the log root alive for the test's duration
    pub dir: TempDir,
    /// Connection pool behind `store`
    pub db: DatabasePool,
    /// Index store under test
    pub store: IndexStore,
}

impl TestEnv {
    /// Create an empty log root and a migrated in-memory database
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = DatabasePool::in_memory()
            .await
            .expect("Failed to open in-memory database");
        logvault_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");
        let store = IndexStore::new(&db);

        Self { dir, db, store }
    }

    /// Root whose subdirectories are services
    pub fn log_root(&self) -> PathBuf {
        self.dir.path().join("logs")
    }

    /// Directory of one service (created on demand)
    pub fn service_dir(&self, service: &str) -> PathBuf {
        let dir = self.log_root().join(service);
        std::fs::create_dir_all(&dir).expect("Failed to create service dir");
        dir
    }

    /// Write a log file and return its path
    pub fn write_log(&self, service: &str, name: &str, content: &[u8]) -> PathBuf {
        let path = self.service_dir(service).join(name);
        std::fs::write(&path, content).expect("Failed to write log file");
        path
    }

    /// Append bytes and push the mtime forward so the change is visible
    /// even on filesystems with coarse timestamps
    pub fn append_log(&self, path: &Path, content: &[u8]) {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(path)
            .expect("Failed to open log file");
        file.write_all(content).expect("Failed to append");
        drop(file);
        bump_mtime(path);
    }

    /// Scanner discovering services under `log_root`
    pub fn scanner(&self) -> LogScanner {
        self.scanner_with(ScannerConfig {
            log_root: Some(self.log_root()),
            ..ScannerConfig::default()
        })
    }

    /// Scanner with an explicit config
    pub fn scanner_with(&self, config: ScannerConfig) -> LogScanner {
        LogScanner::new(&self.store, config)
    }

    /// Retention manager with the given deployment switches
    pub fn retention(&self, archive_enabled: bool) -> RetentionManager {
        RetentionManager::new(
            &self.store,
            &RetentionSettings {
                archive_enabled,
                keep_archived_records: true,
            },
        )
    }

    /// Schedule controller over this environment's scanner and store
    pub fn controller(&self) -> ScheduleController {
        ScheduleController::new(&self.store, self.scanner(), self.retention(true))
    }

    /// The stored row for a file on disk
    pub async fn file_row(&self, path: &Path) -> LogFile {
        let key = stored_path(path);
        self.store
            .files
            .find_by_path(&key)
            .await
            .expect("Failed to query log file")
            .unwrap_or_else(|| panic!("No row for {key}"))
    }
}

/// Path string as the scanner stores it
pub fn stored_path(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| {
            let parent = std::fs::canonicalize(path.parent().expect("path has parent"))
                .expect("Failed to canonicalize parent");
            parent.join(path.file_name().expect("path has file name"))
        })
        .to_string_lossy()
        .into_owned()
}

/// Set a file's mtime a minute into the future
pub fn bump_mtime(path: &Path) {
    let later = SystemTime::now() + Duration::from_secs(60);
    filetime::set_file_mtime(path, FileTime::from_system_time(later))
        .expect("Failed to set mtime");
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared controller, for initialization and shutdown
    pub controller: Arc<ScheduleController>,
    /// Backing environment
    pub env: TestEnv,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let env = TestEnv::new().await;
        let controller = Arc::new(env.controller());
        let state = logvault_api::AppState::new(
            Arc::new(AppConfig::default()),
            env.db.clone(),
            env.store.clone(),
            Arc::clone(&controller),
        );
        let router = logvault_api::build_router(state);

        Self {
            router,
            controller,
            env,
        }
    }

    /// Send a request through the router
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

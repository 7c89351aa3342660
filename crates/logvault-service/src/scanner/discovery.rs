//! Filesystem side of a scan pass: which directories, which files, what stat.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use tracing::warn;
use walkdir::WalkDir;

use logvault_core::config::{ScannerConfig, ServiceDirectory};
use logvault_core::error::{AppError, ErrorKind};
use logvault_core::result::AppResult;
use logvault_entity::log_file::FileStat;

/// Extension of files picked up by the scanner.
pub const LOG_EXTENSION: &str = "log";

static NAME_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("date pattern is valid"));

/// Resolve the service directories to scan.
///
/// Explicitly configured services win. Otherwise every immediate
/// subdirectory of `log_root` is a service named after the directory.
pub fn resolve_services(config: &ScannerConfig) -> Vec<ServiceDirectory> {
    if !config.services.is_empty() {
        return config.services.clone();
    }

    let Some(root) = config.log_root.as_deref() else {
        return Vec::new();
    };

    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "Log root is not readable");
            return Vec::new();
        }
    };

    let mut services: Vec<ServiceDirectory> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| {
            ServiceDirectory::new(entry.file_name().to_string_lossy().into_owned(), entry.path())
        })
        .collect();
    services.sort_by(|a, b| a.name.cmp(&b.name));
    services
}

/// Every `*.log` file under `dir`, recursively, in path order.
///
/// Unreadable subtrees are logged and skipped.
pub async fn list_log_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut files: Vec<PathBuf> = WalkDir::new(&dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Skipping unreadable path");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == LOG_EXTENSION))
            .collect();
        files.sort();
        files
    })
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Directory walk task failed", e))
}

/// Size and modification time of `path`, mtime truncated to milliseconds.
pub async fn stat_file(path: &Path) -> AppResult<FileStat> {
    let metadata = tokio::fs::metadata(path).await?;
    let modified = metadata.modified()?;
    Ok(FileStat {
        size_bytes: i64::try_from(metadata.len()).unwrap_or(i64::MAX),
        modified_at: to_millis(modified),
    })
}

/// Date the file's content belongs to.
///
/// A `YYYY-MM-DD` substring in the file name takes precedence; otherwise
/// the filesystem birth time, and the modification time where the
/// platform does not record birth time.
pub async fn created_date(path: &Path, stat: &FileStat) -> NaiveDate {
    if let Some(date) = path
        .file_name()
        .and_then(|name| date_from_name(&name.to_string_lossy()))
    {
        return date;
    }

    match tokio::fs::metadata(path).await.and_then(|m| m.created()) {
        Ok(born) => DateTime::<Utc>::from(born).date_naive(),
        Err(_) => stat.modified_at.date_naive(),
    }
}

/// First valid `YYYY-MM-DD` date embedded in a file name.
pub fn date_from_name(name: &str) -> Option<NaiveDate> {
    NAME_DATE.captures_iter(name).find_map(|caps| {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn to_millis(time: SystemTime) -> DateTime<Utc> {
    let dt = DateTime::<Utc>::from(time);
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or(dt)
}

//! Incremental log scanner.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use logvault_core::config::{ScannerConfig, ServiceDirectory};
use logvault_core::result::AppResult;
use logvault_database::IndexStore;
use logvault_database::repositories::{LogEntryRepository, LogFileRepository};
use logvault_entity::log_entry::NewLogEntry;
use logvault_entity::log_file::FileId;

use super::discovery;
use super::parser::LineParser;
use crate::outcome::OperationOutcome;

/// Counters for one scan pass (one service or all of them).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Service directories that were walked.
    pub services_scanned: usize,
    /// Service directories that did not exist.
    pub services_skipped: usize,
    /// `*.log` files found.
    pub files_seen: usize,
    /// Files whose entries were rebuilt.
    pub files_indexed: usize,
    /// Files skipped because nothing changed (or already archived).
    pub files_unchanged: usize,
    /// Entries written across all re-indexed files.
    pub entries_indexed: u64,
    /// Files or services that failed and were skipped.
    pub errors: usize,
}

impl ScanSummary {
    fn merge(&mut self, other: &ScanSummary) {
        self.services_scanned += other.services_scanned;
        self.services_skipped += other.services_skipped;
        self.files_seen += other.files_seen;
        self.files_indexed += other.files_indexed;
        self.files_unchanged += other.files_unchanged;
        self.entries_indexed += other.entries_indexed;
        self.errors += other.errors;
    }
}

enum FileScan {
    Unchanged,
    Indexed(u64),
}

/// Keeps the index store in sync with the service log directories.
#[derive(Debug, Clone)]
pub struct LogScanner {
    files: Arc<LogFileRepository>,
    entries: Arc<LogEntryRepository>,
    config: ScannerConfig,
    parser: LineParser,
}

impl LogScanner {
    /// Create a scanner over the given store.
    pub fn new(store: &IndexStore, config: ScannerConfig) -> Self {
        Self {
            files: Arc::clone(&store.files),
            entries: Arc::clone(&store.entries),
            config,
            parser: LineParser::new(),
        }
    }

    /// Service directories a full pass walks.
    pub fn services(&self) -> Vec<ServiceDirectory> {
        discovery::resolve_services(&self.config)
    }

    /// Scan every service. Failures are logged and counted, never returned.
    pub async fn scan_all(&self) -> ScanSummary {
        let mut total = ScanSummary::default();

        for service in self.services() {
            match self.scan_service(&service).await {
                Ok(summary) => total.merge(&summary),
                Err(e) => {
                    warn!(service = %service.name, error = %e, "Service scan failed");
                    total.errors += 1;
                }
            }
        }

        info!(
            services = total.services_scanned,
            skipped = total.services_skipped,
            indexed = total.files_indexed,
            unchanged = total.files_unchanged,
            entries = total.entries_indexed,
            errors = total.errors,
            "Scan pass completed"
        );
        total
    }

    /// Scan one service directory.
    ///
    /// A missing directory is not an error. Per-file failures are logged
    /// and counted so the remaining files are still processed.
    pub async fn scan_service(&self, service: &ServiceDirectory) -> AppResult<ScanSummary> {
        let mut summary = ScanSummary::default();

        if !tokio::fs::try_exists(&service.path).await.unwrap_or(false) {
            warn!(
                service = %service.name,
                path = %service.path.display(),
                "Log directory does not exist, skipping"
            );
            summary.services_skipped = 1;
            return Ok(summary);
        }

        let root = canonical_dir(&service.path).await?;
        let paths = discovery::list_log_files(&root).await?;
        summary.services_scanned = 1;
        summary.files_seen = paths.len();

        for path in paths {
            match self.scan_file(&service.name, &path).await {
                Ok(FileScan::Unchanged) => summary.files_unchanged += 1,
                Ok(FileScan::Indexed(count)) => {
                    summary.files_indexed += 1;
                    summary.entries_indexed += count;
                }
                Err(e) => {
                    warn!(
                        service = %service.name,
                        path = %path.display(),
                        error = %e,
                        "Failed to index log file"
                    );
                    summary.errors += 1;
                }
            }
        }

        debug!(service = %service.name, ?summary, "Service scanned");
        Ok(summary)
    }

    /// Scan the named service immediately (manual trigger).
    pub async fn scan_service_now(&self, service_name: &str) -> OperationOutcome {
        let Some(service) = self
            .services()
            .into_iter()
            .find(|s| s.name == service_name)
        else {
            return OperationOutcome::failure(format!("Unknown service '{service_name}'"));
        };

        match self.scan_service(&service).await {
            Ok(summary) if summary.services_skipped > 0 => OperationOutcome::failure(format!(
                "Log directory for '{service_name}' does not exist"
            )),
            Ok(summary) => OperationOutcome::ok(format!(
                "Scanned {service_name}: {} file(s) indexed, {} unchanged, {} entries, {} error(s)",
                summary.files_indexed,
                summary.files_unchanged,
                summary.entries_indexed,
                summary.errors
            )),
            Err(e) => OperationOutcome::failure(format!("Scan of '{service_name}' failed: {e}")),
        }
    }

    async fn scan_file(&self, service_name: &str, path: &Path) -> AppResult<FileScan> {
        let path_str = path.to_string_lossy().into_owned();
        let stat = discovery::stat_file(path).await?;

        if let Some(existing) = self.files.find_by_path(&path_str).await? {
            if existing.archived || !existing.is_changed(&stat) {
                return Ok(FileScan::Unchanged);
            }
        }

        let file_id = self.files.upsert_file(&path_str, service_name).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_str.clone());
        let created = discovery::created_date(path, &stat).await;
        self.files
            .update_details(file_id, service_name, &file_name, created)
            .await?;

        let count = self.reindex(file_id, path).await?;

        // Stat is recorded last so a failed re-index is retried next pass.
        self.files.record_indexed(file_id, &stat).await?;

        debug!(path = %path_str, entries = count, "Re-indexed log file");
        Ok(FileScan::Indexed(count))
    }

    /// Stream the file line by line, committing every `batch_size` entries.
    ///
    /// The first batch replaces the file's previous entries; later batches
    /// append.
    async fn reindex(&self, file_id: FileId, path: &Path) -> AppResult<u64> {
        let batch_size = self.config.batch_size.max(1);
        let file = tokio::fs::File::open(path).await?;
        let mut reader = BufReader::new(file);

        let now = Utc::now();
        let mut buf = Vec::new();
        let mut line_number: i64 = 0;
        let mut batch: Vec<NewLogEntry> = Vec::with_capacity(batch_size);
        let mut cleared = false;
        let mut written = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            line_number += 1;

            let line = String::from_utf8_lossy(&buf);
            if line.trim().is_empty() {
                continue;
            }
            batch.push(self.parser.parse(&line, line_number, now));

            if batch.len() >= batch_size {
                written += self.flush(file_id, &mut batch, &mut cleared).await?;
            }
        }

        if !cleared || !batch.is_empty() {
            written += self.flush(file_id, &mut batch, &mut cleared).await?;
        }
        Ok(written)
    }

    async fn flush(
        &self,
        file_id: FileId,
        batch: &mut Vec<NewLogEntry>,
        cleared: &mut bool,
    ) -> AppResult<u64> {
        let written = if *cleared {
            self.entries.append_entries(file_id, batch).await?
        } else {
            *cleared = true;
            self.entries.replace_entries(file_id, batch).await?
        };
        batch.clear();
        Ok(written)
    }
}

/// Resolve a service directory the way the scanner does before storing paths.
pub async fn canonical_dir(path: &Path) -> AppResult<PathBuf> {
    Ok(tokio::fs::canonicalize(path).await?)
}

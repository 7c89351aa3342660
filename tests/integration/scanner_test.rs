//! Integration tests for the log scanner.

use chrono::NaiveDate;

use logvault_core::config::{ScannerConfig, ServiceDirectory};
use logvault_entity::log_entry::LogLevel;

use crate::helpers::{self, TestEnv};

const PLAIN: &[u8] = b"2024-01-01T10:00:00Z [INFO] service started\n\
2024-01-01T10:00:01Z [WARN] cache miss ratio high\n\
2024-01-01T10:00:02Z [ERROR] upstream timeout\n";

#[tokio::test]
async fn test_rescan_of_unchanged_file_is_noop() {
    let env = TestEnv::new().await;
    let path = env.write_log("user-service", "app.log", PLAIN);
    let scanner = env.scanner();

    let first = scanner.scan_all().await;
    assert_eq!(first.files_indexed, 1);
    assert_eq!(first.entries_indexed, 3);

    let row = env.file_row(&path).await;
    let ids: Vec<i64> = env
        .store
        .entries
        .find_by_file(row.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();

    let second = scanner.scan_all().await;
    assert_eq!(second.files_indexed, 0);
    assert_eq!(second.files_unchanged, 1);
    assert_eq!(second.entries_indexed, 0);

    let again = env.file_row(&path).await;
    assert_eq!(again.size_bytes, row.size_bytes);
    assert_eq!(again.modified_at, row.modified_at);
    assert_eq!(env.store.entries.count_all().await.unwrap(), 3);

    let ids_after: Vec<i64> = env
        .store
        .entries
        .find_by_file(row.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, ids_after);
}

#[tokio::test]
async fn test_appended_file_is_fully_reindexed() {
    let env = TestEnv::new().await;
    let path = env.write_log("user-service", "app.log", PLAIN);
    let scanner = env.scanner();
    scanner.scan_all().await;

    let row = env.file_row(&path).await;
    let old_max_id = env
        .store
        .entries
        .find_by_file(row.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .max()
        .unwrap();

    env.append_log(&path, b"2024-01-01T10:00:03Z [DEBUG] retrying\n");
    let summary = scanner.scan_all().await;
    assert_eq!(summary.files_indexed, 1);
    assert_eq!(summary.entries_indexed, 4);

    let entries = env.store.entries.find_by_file(row.id).await.unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e.id > old_max_id));
    let lines: Vec<i64> = entries.iter().map(|e| e.line_number).collect();
    assert_eq!(lines, vec![1, 2, 3, 4]);
    assert_eq!(entries[3].level, LogLevel::Debug);

    let updated = env.file_row(&path).await;
    assert_eq!(updated.id, row.id);
    assert!(updated.size_bytes > row.size_bytes);
}

#[tokio::test]
async fn test_newer_mtime_alone_triggers_reindex() {
    let env = TestEnv::new().await;
    let path = env.write_log("user-service", "app.log", PLAIN);
    let scanner = env.scanner();
    scanner.scan_all().await;

    helpers::bump_mtime(&path);
    let summary = scanner.scan_all().await;

    assert_eq!(summary.files_indexed, 1);
    assert_eq!(env.store.entries.count_all().await.unwrap(), 3);
}

#[tokio::test]
async fn test_every_non_blank_line_yields_one_entry() {
    let env = TestEnv::new().await;
    let mut content = Vec::new();
    content.extend_from_slice(b"{\"timestamp\":\"2024-01-10T08:00:00Z\",\"level\":\"ERR\",\"message\":\"boom\",\"metadata\":{\"code\":500}}\n");
    content.extend_from_slice(b"2024-01-10T08:00:01Z [warning] slow query\n");
    content.extend_from_slice(b"   \n");
    content.extend_from_slice(b"{\"level\":\"verbose\",\"message\":\"   \"}\n");
    content.extend_from_slice(b"{broken json\n");
    content.extend_from_slice(b"\xc3\x28\xa0\xa1 binary junk\r\n");
    content.extend_from_slice(b"{}\n");
    content.extend_from_slice(b"no trailing newline");
    let path = env.write_log("billing", "mixed.log", &content);

    env.scanner().scan_all().await;

    let row = env.file_row(&path).await;
    let entries = env.store.entries.find_by_file(row.id).await.unwrap();
    assert_eq!(entries.len(), 7);
    assert!(entries.iter().all(|e| !e.message.trim().is_empty()));

    assert_eq!(entries[0].level, LogLevel::Error);
    assert_eq!(entries[0].message, "boom");
    assert_eq!(entries[0].metadata.as_ref().unwrap()["code"], 500);
    assert_eq!(entries[1].level, LogLevel::Warn);
    assert_eq!(entries[2].line_number, 4);
    assert_eq!(entries[2].level, LogLevel::Debug);
    assert_eq!(entries[6].message, "no trailing newline");
}

#[tokio::test]
async fn test_created_date_comes_from_file_name() {
    let env = TestEnv::new().await;
    let path = env.write_log("user-service", "app-2024-01-10.log", PLAIN);

    env.scanner().scan_all().await;

    let row = env.file_row(&path).await;
    assert_eq!(row.created_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    assert_eq!(row.service_name, "user-service");
    assert_eq!(row.file_name, "app-2024-01-10.log");
}

#[tokio::test]
async fn test_nested_files_and_missing_directories() {
    let env = TestEnv::new().await;
    let api = env.service_dir("api");
    std::fs::create_dir_all(api.join("2024/01")).unwrap();
    std::fs::write(api.join("2024/01/worker.log"), "plain line\n").unwrap();
    std::fs::write(api.join("notes.txt"), "ignored\n").unwrap();

    let scanner = env.scanner_with(ScannerConfig::with_services(vec![
        ServiceDirectory::new("api", &api),
        ServiceDirectory::new("ghost", env.log_root().join("ghost")),
    ]));
    let summary = scanner.scan_all().await;

    assert_eq!(summary.services_scanned, 1);
    assert_eq!(summary.services_skipped, 1);
    assert_eq!(summary.files_seen, 1);
    assert_eq!(summary.errors, 0);

    let row = env.file_row(&api.join("2024/01/worker.log")).await;
    assert_eq!(row.service_name, "api");
}

#[tokio::test]
async fn test_archived_file_is_not_rescanned() {
    let env = TestEnv::new().await;
    let path = env.write_log("user-service", "app.log", PLAIN);
    let scanner = env.scanner();
    scanner.scan_all().await;

    let row = env.file_row(&path).await;
    env.store.files.mark_archived(row.id).await.unwrap();
    env.append_log(&path, b"late line\n");

    let summary = scanner.scan_all().await;
    assert_eq!(summary.files_indexed, 0);
    assert_eq!(summary.files_unchanged, 1);
    assert_eq!(env.store.entries.count_for_file(row.id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_scan_now_reports_outcome() {
    let env = TestEnv::new().await;
    env.write_log("user-service", "app.log", PLAIN);
    let scanner = env.scanner();

    let outcome = scanner.scan_service_now("user-service").await;
    assert!(outcome.success, "{}", outcome.message);
    assert!(outcome.message.contains("1 file(s) indexed"));

    let outcome = scanner.scan_service_now("payments").await;
    assert!(!outcome.success);
}

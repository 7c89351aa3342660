//! Integration tests for retention cleanup.

use std::io::Read;

use chrono::{Days, NaiveDate, Utc};

use logvault_service::retention::archive::ARCHIVE_DIR;
use logvault_service::RetentionManager;

use crate::helpers::TestEnv;

fn dated_name(date: NaiveDate) -> String {
    format!("app-{}.log", date.format("%Y-%m-%d"))
}

fn archived_files(dir: &std::path::Path) -> Vec<String> {
    match std::fs::read_dir(dir.join(ARCHIVE_DIR)) {
        Ok(read) => read
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn test_only_files_before_cutoff_expire() {
    let env = TestEnv::new().await;
    let today = Utc::now().date_naive();
    let old = env.write_log("api", &dated_name(today - Days::new(10)), b"one\ntwo\n");
    let older = env.write_log("api", &dated_name(today - Days::new(8)), b"three\n");
    let recent = env.write_log("api", &dated_name(today - Days::new(5)), b"four\nfive\n");
    env.scanner().scan_all().await;

    let summary = env.retention(true).cleanup(7).await.unwrap();

    assert_eq!(summary.files_considered, 2);
    assert_eq!(summary.archived, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.entries_purged, 3);

    assert!(env.file_row(&old).await.archived);
    assert!(env.file_row(&older).await.archived);
    let kept = env.file_row(&recent).await;
    assert!(!kept.archived);
    assert_eq!(env.store.entries.count_for_file(kept.id).await.unwrap(), 2);

    assert!(!old.exists());
    assert!(recent.exists());
    assert_eq!(archived_files(&env.service_dir("api")).len(), 2);
}

#[tokio::test]
async fn test_user_service_cleanup_walkthrough() {
    let env = TestEnv::new().await;
    let first = env.write_log(
        "user-service",
        "app-2024-01-01.log",
        b"2024-01-01T09:00:00Z [INFO] boot\n\
2024-01-01T09:00:01Z [WARN] slow disk\n\
2024-01-01T09:00:02Z [ERROR] crash\n",
    );
    let second = env.write_log(
        "user-service",
        "app-2024-01-10.log",
        b"{\"timestamp\":\"2024-01-10T12:00:00Z\",\"level\":\"info\",\"message\":\"recovered\"}\n",
    );

    let scan = env.scanner().scan_all().await;
    assert_eq!(scan.files_indexed, 2);
    assert_eq!(env.store.entries.count_all().await.unwrap(), 4);

    let today = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();
    let summary = env.retention(true).cleanup_as_of(5, today).await.unwrap();
    assert_eq!(summary.cutoff_date, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    assert_eq!(summary.archived, 1);

    assert_eq!(env.store.files.count(false).await.unwrap(), 1);
    assert_eq!(env.store.entries.count_all().await.unwrap(), 1);

    let stored_first = env
        .store
        .files
        .find_by_path(&crate::helpers::stored_path(&first))
        .await
        .unwrap();
    assert!(stored_first.unwrap().archived);
    assert!(!env.file_row(&second).await.archived);

    let archives = archived_files(&env.service_dir("user-service"));
    assert_eq!(archives.len(), 1);
    assert!(archives[0].ends_with("-app-2024-01-01.log.gz"));

    let gz = std::fs::File::open(
        env.service_dir("user-service").join(ARCHIVE_DIR).join(&archives[0]),
    )
    .unwrap();
    let mut restored = String::new();
    flate2::read::GzDecoder::new(gz).read_to_string(&mut restored).unwrap();
    assert_eq!(restored.lines().count(), 3);
    assert!(restored.contains("[ERROR] crash"));
}

#[tokio::test]
async fn test_delete_mode_removes_files() {
    let env = TestEnv::new().await;
    let path = env.write_log("api", "app-2024-01-01.log", b"gone soon\n");
    env.scanner().scan_all().await;
    let key = crate::helpers::stored_path(&path);

    let manager = env.retention(false);
    assert!(!manager.archive_enabled());
    let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let summary = manager.cleanup_as_of(7, today).await.unwrap();

    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.archived, 0);
    assert!(!path.exists());
    assert!(archived_files(&env.service_dir("api")).is_empty());
    assert!(env.store.files.find_by_path(&key).await.unwrap().unwrap().archived);
}

#[tokio::test]
async fn test_archive_outputs_are_not_rescanned() {
    let env = TestEnv::new().await;
    env.write_log("api", "app-2024-01-01.log", b"old\n");
    env.write_log("api", "app-2024-03-01.log", b"new\n");
    let scanner = env.scanner();
    scanner.scan_all().await;

    let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    env.retention(true).cleanup_as_of(7, today).await.unwrap();

    let summary = scanner.scan_all().await;
    assert_eq!(summary.files_seen, 1);
    assert_eq!(summary.files_indexed, 0);
    assert_eq!(env.store.entries.count_all().await.unwrap(), 1);
}

#[tokio::test]
async fn test_second_pass_finds_nothing() {
    let env = TestEnv::new().await;
    env.write_log("api", "app-2024-01-01.log", b"old\n");
    env.scanner().scan_all().await;

    let manager: RetentionManager = env.retention(true);
    let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    assert_eq!(manager.cleanup_as_of(7, today).await.unwrap().archived, 1);

    let again = manager.cleanup_as_of(7, today).await.unwrap();
    assert_eq!(again.files_considered, 0);
    assert_eq!(again.entries_purged, 0);
}

#[tokio::test]
async fn test_manual_cleanup_outcomes() {
    let env = TestEnv::new().await;
    let today = Utc::now().date_naive();
    env.write_log("api", &dated_name(today - Days::new(30)), b"ancient\n");
    env.scanner().scan_all().await;
    let manager = env.retention(true);

    let rejected = manager.manual_cleanup(Some(0)).await;
    assert!(!rejected.success);
    assert_eq!(env.store.files.count(false).await.unwrap(), 1);

    let done = manager.manual_cleanup(None).await;
    assert!(done.success, "{}", done.message);
    assert!(done.message.contains("1 archived"));
    assert_eq!(env.store.files.count(false).await.unwrap(), 0);
}

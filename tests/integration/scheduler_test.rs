//! Integration tests for the schedule controller.

use std::sync::Arc;

use logvault_entity::retention::UpdateRetentionConfig;
use logvault_worker::{ControllerState, JobKind};

use crate::helpers::TestEnv;

fn update(enabled: bool, retention_days: i64, schedule: &str) -> UpdateRetentionConfig {
    UpdateRetentionConfig {
        enabled,
        retention_days,
        schedule: schedule.to_string(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_updates_leave_one_job_per_kind() {
    let env = TestEnv::new().await;
    let controller = Arc::new(env.controller());
    controller.initialize().await.unwrap();
    let original: Vec<_> = controller
        .registered_jobs()
        .await
        .into_iter()
        .map(|j| j.id)
        .collect();

    let schedules = ["0 1 * * *", "30 2 * * *", "0 0 3 * * *", "15 4 * * 1"];
    let mut handles = Vec::new();
    for (i, schedule) in schedules.iter().enumerate() {
        let controller = Arc::clone(&controller);
        let schedule = schedule.to_string();
        handles.push(tokio::spawn(async move {
            controller.update_config(update(true, 3 + i as i64, &schedule)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let jobs = controller.registered_jobs().await;
    let cleanup: Vec<_> = jobs.iter().filter(|j| j.kind == JobKind::Cleanup).collect();
    let scan: Vec<_> = jobs.iter().filter(|j| j.kind == JobKind::Scan).collect();
    assert_eq!(cleanup.len(), 1);
    assert_eq!(scan.len(), 1);

    let persisted = controller.get_config().await.unwrap();
    assert_eq!(
        cleanup[0].schedule,
        logvault_worker::cron::normalize(&persisted.schedule).unwrap()
    );
    assert_eq!(controller.state().await, ControllerState::Running);

    for id in original {
        assert!(jobs.iter().all(|j| j.id != id));
        assert!(controller.next_fire_time(id).await.is_none());
    }

    controller.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_disable_then_enable() {
    let env = TestEnv::new().await;
    let controller = env.controller();
    controller.initialize().await.unwrap();

    controller
        .update_config(update(false, 7, "0 2 * * *"))
        .await
        .unwrap();
    assert!(controller.registered_jobs().await.is_empty());
    assert_eq!(controller.state().await, ControllerState::Stopped);
    assert!(controller.get_config().await.unwrap().next_run.is_none());

    controller
        .update_config(update(true, 14, "0 2 * * *"))
        .await
        .unwrap();
    assert_eq!(controller.registered_jobs().await.len(), 2);
    assert_eq!(controller.state().await, ControllerState::Running);
    assert_eq!(controller.get_config().await.unwrap().retention_days, 14);

    controller.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalid_update_keeps_previous_jobs() {
    let env = TestEnv::new().await;
    let controller = env.controller();
    controller.initialize().await.unwrap();
    let before = controller.registered_jobs().await;

    let err = controller
        .update_config(update(true, 0, "0 2 * * *"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = controller
        .update_config(update(true, 7, "not a schedule"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(controller.registered_jobs().await, before);
    assert_eq!(controller.get_config().await.unwrap().retention_days, 7);

    controller.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_manual_triggers_work_without_scheduler() {
    let env = TestEnv::new().await;
    env.write_log("orders", "app-2024-01-01.log", b"placed\nshipped\n");
    let controller = env.controller();

    let scan = controller.trigger_scan("orders").await;
    assert!(scan.success, "{}", scan.message);
    assert_eq!(env.store.entries.count_all().await.unwrap(), 2);

    let cleanup = controller.trigger_cleanup(Some(1)).await;
    assert!(cleanup.success, "{}", cleanup.message);
    assert_eq!(env.store.entries.count_all().await.unwrap(), 0);
    assert_eq!(controller.state().await, ControllerState::Uninitialized);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_then_restart() {
    let env = TestEnv::new().await;
    let controller = env.controller();
    controller.initialize().await.unwrap();
    controller.initialize().await.unwrap();
    assert_eq!(controller.registered_jobs().await.len(), 2);

    controller.shutdown().await.unwrap();

    assert!(controller.registered_jobs().await.is_empty());
    assert_eq!(controller.state().await, ControllerState::Stopped);
    assert!(controller.next_cleanup_run().await.is_none());
    assert!(controller.get_config().await.unwrap().next_run.is_none());

    let saved = controller
        .update_config(update(true, 9, "0 5 * * *"))
        .await
        .unwrap();
    assert_eq!(saved.retention_days, 9);
    assert!(controller.registered_jobs().await.is_empty());

    controller.initialize().await.unwrap();
    assert_eq!(controller.state().await, ControllerState::Running);
    let jobs = controller.registered_jobs().await;
    assert_eq!(jobs.len(), 2);
    let cleanup = jobs.iter().find(|j| j.kind == JobKind::Cleanup).unwrap();
    assert_eq!(cleanup.schedule, "0 0 5 * * *");

    controller.shutdown().await.unwrap();
}

//! Integration tests for the HTTP API.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

const LINES: &[u8] = b"2024-01-01T10:00:00Z [INFO] request served\n\
2024-01-01T10:00:01Z [ERROR] db unreachable\n\
{\"timestamp\":\"2024-01-01T10:00:02Z\",\"level\":\"err\",\"message\":\"retry failed\"}\n";

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/api/health", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["data"]["status"], "ok");
    assert_eq!(res.body["data"]["database"], "connected");
    assert_eq!(res.body["data"]["scheduler"], "uninitialized");
}

#[tokio::test]
async fn test_config_defaults() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/api/logs/config", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["enabled"], true);
    assert_eq!(res.body["retentionDays"], 7);
    assert_eq!(res.body["schedule"], "0 0 2 * * *");
    assert!(res.body["lastRun"].is_null());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_config_update_validation() {
    let app = TestApp::new().await;
    app.controller.initialize().await.unwrap();

    let res = app
        .request(
            "PUT",
            "/api/logs/config",
            Some(json!({"enabled": true, "retentionDays": 0, "schedule": "0 2 * * *"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION_ERROR");

    let res = app
        .request(
            "PUT",
            "/api/logs/config",
            Some(json!({"enabled": true, "retentionDays": 7, "schedule": "every night"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .request(
            "PUT",
            "/api/logs/config",
            Some(json!({"enabled": true, "retentionDays": 30, "schedule": "0 3 * * *"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["retentionDays"], 30);
    assert_eq!(res.body["schedule"], "0 3 * * *");

    let res = app.request("GET", "/api/logs/config", None).await;
    assert_eq!(res.body["retentionDays"], 30);

    app.controller.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_scan_then_query_entries() {
    let app = TestApp::new().await;
    app.env.write_log("checkout", "app-2024-01-01.log", LINES);

    let res = app.request("POST", "/api/logs/scan/checkout", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true, "{}", res.body["message"]);

    let res = app
        .request("GET", "/api/logs/entries?service=checkout&level=error", None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let page = &res.body["data"];
    assert_eq!(page["total_items"], 2);
    let messages: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["retry failed", "db unreachable"]);

    let res = app
        .request("GET", "/api/logs/entries?service=checkout&page=1&pageSize=1", None)
        .await;
    assert_eq!(res.body["data"]["total_items"], 3);
    assert_eq!(res.body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(res.body["data"]["total_pages"], 3);
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let app = TestApp::new().await;
    app.env.write_log("checkout", "app.log", LINES);
    app.env.scanner().scan_all().await;

    for path in [
        "/api/logs/entries?page=18446744073709551615&pageSize=500",
        "/api/logs/files?service=checkout&page=36893488147419103&pageSize=500",
    ] {
        let res = app.request("GET", path, None).await;
        assert_eq!(res.status, StatusCode::OK, "{path}");
        assert!(res.body["data"]["items"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_unknown_level_is_rejected() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/api/logs/entries?level=fatal", None).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_scan_unknown_service_reports_failure() {
    let app = TestApp::new().await;

    let res = app.request("POST", "/api/logs/scan/nobody", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], false);
}

#[tokio::test]
async fn test_cleanup_endpoint() {
    let app = TestApp::new().await;
    app.env.write_log("checkout", "app-2024-01-01.log", LINES);
    app.request("POST", "/api/logs/scan/checkout", None).await;

    let res = app
        .request("POST", "/api/logs/cleanup", Some(json!({"retentionDays": 0})))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], false);

    let res = app.request("POST", "/api/logs/cleanup", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true, "{}", res.body["message"]);

    let res = app
        .request("GET", "/api/logs/files?service=checkout", None)
        .await;
    assert_eq!(res.body["data"]["total_items"], 0);

    let res = app
        .request(
            "GET",
            "/api/logs/files?service=checkout&includeArchived=true",
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let files = res.body["data"]["items"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["archived"], true);
    assert_eq!(files[0]["fileName"], "app-2024-01-01.log");
}

#[tokio::test]
async fn test_stats() {
    let app = TestApp::new().await;
    app.env.write_log("checkout", "app.log", LINES);
    app.env.write_log("search", "app.log", b"plain message\n");
    app.env.scanner().scan_all().await;

    let res = app.request("GET", "/api/logs/stats", None).await;
    assert_eq!(res.status, StatusCode::OK);
    let stats = &res.body["data"];
    assert_eq!(stats["services"], json!(["checkout", "search"]));
    assert_eq!(stats["activeFiles"], 2);
    assert_eq!(stats["totalFiles"], 2);
    assert_eq!(stats["entries"], 4);
    assert_eq!(stats["levels"]["error"], 2);
    assert_eq!(stats["levels"]["info"], 2);

    let res = app.request("GET", "/api/logs/stats?service=search", None).await;
    assert_eq!(res.body["data"]["entries"], 1);
}

// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use common::{file_cache_only_snapshot, sample_snapshot, test_app_config};
use opcache_dashboard::config::AppConfig;
use opcache_dashboard::models::RawSnapshot;
use opcache_dashboard::routes;
use opcache_dashboard::runtime_repo::{FixtureRuntime, RuntimeRepo};
use std::sync::Arc;

fn accept_json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

fn test_app_with(snapshot: RawSnapshot, config: AppConfig) -> axum::Router {
    let repo = RuntimeRepo::new(Arc::new(FixtureRuntime::new(snapshot)));
    routes::app(repo, config)
}

fn test_server() -> TestServer {
    TestServer::try_new(test_app_with(sample_snapshot(), test_app_config())).unwrap()
}

/// Build TestServer with http_transport (required for WebSocket tests).
fn test_server_with_http() -> TestServer {
    TestServer::builder()
        .http_transport()
        .try_build(test_app_with(sample_snapshot(), test_app_config()))
        .unwrap()
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = test_server();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("opcache_dashboard")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_json_state() {
    let server = test_server();
    let response = server.get("/").add_header(header::ACCEPT, accept_json()).await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["scripts"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["overview"]["memory"]["usedPercentage"], 25);
    assert_eq!(json["overview"]["statistics"]["hits"]["display"], "900");
    assert_eq!(json["presence"]["fileCacheOnly"], false);
}

#[tokio::test]
async fn test_json_section() {
    let server = test_server();
    let response = server
        .get("/")
        .add_query_param("section", "overview")
        .add_header(header::ACCEPT, accept_json())
        .await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert!(json.get("memory").is_some());
    assert!(json.get("statistics").is_some());
}

#[tokio::test]
async fn test_unknown_section_is_not_found() {
    let server = test_server();
    let response = server
        .get("/")
        .add_query_param("section", "bogus")
        .add_header(header::ACCEPT, accept_json())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_snapshot_is_bad_gateway() {
    let mut broken = sample_snapshot();
    broken.memory = None;
    let server = TestServer::try_new(test_app_with(broken, test_app_config())).unwrap();
    let response = server.get("/").add_header(header::ACCEPT, accept_json()).await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_reset_json_then_state_is_empty() {
    let server = test_server();
    let response = server
        .get("/")
        .add_query_param("reset", "1")
        .add_header(header::ACCEPT, accept_json())
        .await;
    response.assert_status_ok();
    response.assert_json(&serde_json::json!({ "success": "yes" }));

    let state: serde_json::Value = server
        .get("/")
        .add_header(header::ACCEPT, accept_json())
        .await
        .json();
    assert_eq!(state["scripts"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_invalidate_unknown_path_reports_no() {
    let server = test_server();
    let response = server
        .get("/")
        .add_query_param("invalidate", "/missing.php")
        .add_header(header::ACCEPT, accept_json())
        .await;
    response.assert_json(&serde_json::json!({ "success": "no" }));
}

#[tokio::test]
async fn test_invalidate_searched_json() {
    let server = test_server();
    let response = server
        .get("/")
        .add_query_param("invalidate_searched", "app")
        .add_header(header::ACCEPT, accept_json())
        .await;
    response.assert_json(&serde_json::json!({ "success": "yes" }));

    let state: serde_json::Value = server
        .get("/")
        .add_header(header::ACCEPT, accept_json())
        .await
        .json();
    let invalidated = state["scripts"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["invalidated"] == true)
        .count();
    assert_eq!(invalidated, 2);
}

#[tokio::test]
async fn test_disallowed_reset_reports_no() {
    let mut config = test_app_config();
    config.presenter.allow_reset = false;
    let server = TestServer::try_new(test_app_with(sample_snapshot(), config)).unwrap();
    let response = server
        .get("/")
        .add_query_param("reset", "1")
        .add_header(header::ACCEPT, accept_json())
        .await;
    response.assert_json(&serde_json::json!({ "success": "no" }));
}

#[tokio::test]
async fn test_invalidate_without_json_redirects() {
    let server = test_server();
    let response = server
        .get("/")
        .add_query_param("invalidate", "/var/www/app/index.php")
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), "/");
}

#[tokio::test]
async fn test_html_page() {
    let server = test_server();
    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("id=\"region-overview\""));
    assert!(html.contains("id=\"gauge-memory\""));
    assert!(html.contains("data-realtime=\"false\""));
    assert!(html.contains("C:/www/Lib/Util.php"));
    assert!(html.contains("<h3>Available functions</h3>"));
}

#[tokio::test]
async fn test_html_page_reads_realtime_cookie() {
    let server = test_server();
    let response = server
        .get("/")
        .add_header(
            header::COOKIE,
            HeaderValue::from_static("other=1; opcachegui_realtime=true"),
        )
        .await;
    assert!(response.text().contains("data-realtime=\"true\""));
}

#[tokio::test]
async fn test_html_file_cache_only_notice() {
    let server =
        TestServer::try_new(test_app_with(file_cache_only_snapshot(), test_app_config())).unwrap();
    let html = server.get("/").await.text();
    assert!(html.contains("class=\"notice file-cache-only\""));
    assert!(!html.contains("id=\"gauge-memory\""));
}

// --- WebSocket message tests (require http_transport + ws feature) ---
// Receive until a message matches (server may send Ping first).

async fn receive_json_where(
    ws: &mut axum_test::TestWebSocket,
    pred: impl Fn(&serde_json::Value) -> bool,
) -> serde_json::Value {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<serde_json::Value>(&text) {
            if pred(&v) {
                return v;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_receives_region_updates() {
    let server = test_server_with_http();
    let mut ws = server.get_websocket("/ws").await.into_websocket().await;
    let update = receive_json_where(&mut ws, |v| v["type"] == "region").await;
    assert_eq!(update["region"], "overview");
    assert_eq!(update["id"], "region-overview");
    assert!(update["html"].as_str().is_some_and(|h| !h.is_empty()));
    let gauge = receive_json_where(&mut ws, |v| v["type"] == "gauge").await;
    assert_eq!(gauge["metric"], "memory");
    assert_eq!(gauge["animation"]["to"], 90);
    assert_eq!(gauge["animation"]["percent"], 25);
}

#[tokio::test]
async fn test_ws_select_tab() {
    let server = test_server_with_http();
    let mut ws = server.get_websocket("/ws").await.into_websocket().await;
    receive_json_where(&mut ws, |v| v["type"] == "region").await;
    ws.send_json(&serde_json::json!({ "type": "selectTab", "tab": "files" }))
        .await;
    let update = receive_json_where(&mut ws, |v| v["type"] == "tab").await;
    assert_eq!(update["active"], "files");
}

#[tokio::test]
async fn test_ws_realtime_toggle_returns_cookie() {
    let server = test_server_with_http();
    let mut ws = server.get_websocket("/ws").await.into_websocket().await;
    ws.send_json(&serde_json::json!({ "type": "realtime", "enabled": true }))
        .await;
    let update = receive_json_where(&mut ws, |v| v["type"] == "realtime").await;
    assert_eq!(update["enabled"], true);
    assert!(
        update["setCookie"]
            .as_str()
            .is_some_and(|c| c.starts_with("opcachegui_realtime=true"))
    );
}

//! API tests through the router, without a listening socket

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use pool_guest_logger::{
    api,
    config::AppConfig,
    error::ChannelError,
    models::Reading,
    repository::Repository,
    scraper::LiveSource,
    services::Services,
    AppState,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::common::{insert, memory_repository, serve_page, unused_addr};

/// Fallback source that is never reachable
struct Offline;

#[async_trait]
impl LiveSource for Offline {
    async fn fetch_live(&self, _uid: Option<String>) -> Result<Reading, ChannelError> {
        Err(ChannelError::ConnectFailed("offline".to_string()))
    }
}

struct TestApp {
    router: Router,
    repository: Repository,
    _dir: tempfile::TempDir,
}

async fn app(target_url: String) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.scraper.target_url = target_url;
    config.scraper.request_timeout_secs = 5;
    config.scraper.raw_capture_path = dir.path().join("last_response.html");

    let repository = memory_repository(config.history.max_limit).await;
    let services = Services::with_live_source(repository.clone(), &config, Arc::new(Offline)).unwrap();
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    TestApp {
        router: api::create_router(state),
        repository,
        _dir: dir,
    }
}

async fn call(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let app = app(format!("http://{}/", unused_addr())).await;

    let (status, body) = call(&app.router, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = call(&app.router, "GET", "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_latest_empty_is_null() {
    let app = app(format!("http://{}/", unused_addr())).await;

    let (status, body) = call(&app.router, "GET", "/api/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_log_then_read() {
    let url = serve_page(StatusCode::OK, "<span>Anzahl Gäste 73 von 250</span>").await;
    let app = app(url).await;

    let (status, body) = call(&app.router, "POST", "/api/log").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 73);
    assert_eq!(body["capacity"], 250);

    let (status, latest) = call(&app.router, "GET", "/api/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["id"], body["id"]);
    assert_eq!(latest["count"], 73);

    let (_, history) = call(&app.router, "GET", "/api/history").await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_log_unreachable_page_is_bad_gateway() {
    let app = app(format!("http://{}/", unused_addr())).await;

    let (status, body) = call(&app.router, "POST", "/api/log").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "FetchFailure");
    assert!(app.repository.guest_logs.latest().await.unwrap().is_none());
}

#[tokio::test]
async fn test_log_unparseable_page_is_bad_gateway() {
    let url = serve_page(StatusCode::OK, "<html>Geschlossen</html>").await;
    let app = app(url).await;

    let (status, _) = call(&app.router, "POST", "/api/log").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(app.repository.guest_logs.latest().await.unwrap().is_none());
}

#[tokio::test]
async fn test_history_limit_is_clamped() {
    let app = app(format!("http://{}/", unused_addr())).await;
    let now = Utc::now();
    for count in 0..3 {
        insert(&app.repository, now, count, None).await;
    }

    let (status, body) = call(&app.router, "GET", "/api/history?limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["count"], 2);

    let (_, body) = call(&app.router, "GET", "/api/history?limit=2").await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_daily_aggregates() {
    let app = app(format!("http://{}/", unused_addr())).await;
    let now = Utc::now();
    for count in [10, 20, 30] {
        insert(&app.repository, now, count, Some(250)).await;
    }

    let (status, body) = call(&app.router, "GET", "/api/daily?days=500").await;
    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["sample_count"], 3);
    assert_eq!(days[0]["avg_count"], 20.0);
    assert_eq!(days[0]["min_count"], 10);
    assert_eq!(days[0]["max_count"], 30);
}

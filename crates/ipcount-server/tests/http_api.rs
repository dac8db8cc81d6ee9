#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ipcount_core::error::{IpCountError, Result};
use ipcount_server::app_state::AppState;
use ipcount_server::config::{ServiceConfig, StoreKind};
use ipcount_server::router::build_router;
use ipcount_server::store::{CountingStore, MemoryCounter};
use ipcount_server::api;

fn memory_app() -> Router {
    let state = AppState::new(ServiceConfig::default(), Arc::new(MemoryCounter::new()));
    build_router(state)
}

fn get_from(path: &str, remote: &str) -> Request<Body> {
    let addr: SocketAddr = remote.parse().expect("socket addr");
    let mut req = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("build request");
    req.extensions_mut().insert(ConnectInfo(addr));
    req
}

/// A request the transport could not attach a peer address to.
fn get_without_peer(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("build request")
}

async fn body_text(response: axum::http::Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).expect("parse JSON")
}

#[tokio::test]
async fn first_visit_counts_one() {
    let app = memory_app();

    let response = app.oneshot(get_from("/visit", "10.0.0.1:50000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );
    assert_eq!(body_text(response).await, r#"{"ip":"10.0.0.1","visits":1}"#);
}

#[tokio::test]
async fn repeated_visits_accumulate() {
    let app = memory_app();

    let mut last = Value::Null;
    for port in [50000, 50001, 50002] {
        let response = app
            .clone()
            .oneshot(get_from("/visit", &format!("10.0.0.1:{port}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        last = json_body(response).await;
    }
    assert_eq!(last["ip"], "10.0.0.1");
    assert_eq!(last["visits"], 3);
}

#[tokio::test]
async fn stats_counts_distinct_callers() {
    let app = memory_app();

    for remote in ["10.0.0.1:1000", "10.0.0.2:1000", "10.0.0.1:2000"] {
        let response = app.clone().oneshot(get_from("/visit", remote)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get_from("/stats", "10.0.0.3:1000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"unique_ips":2}"#);
}

#[tokio::test]
async fn health_is_static() {
    let app = memory_app();

    let response = app.oneshot(get_from("/health", "127.0.0.1:40000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn whoami_echoes_caller() {
    let app = memory_app();

    let response = app.clone().oneshot(get_from("/whoami", "192.168.1.20:3333")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"ip":"192.168.1.20"}"#);

    let response = app.oneshot(get_from("/whoami", "[2001:db8::7]:3333")).await.unwrap();
    assert_eq!(json_body(response).await["ip"], "2001:db8::7");
}

#[tokio::test]
async fn unparseable_peer_is_bad_request_without_mutation() {
    let app = memory_app();

    let response = app.clone().oneshot(get_without_peer("/whoami")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "BAD_REQUEST");

    let response = app.clone().oneshot(get_without_peer("/visit")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get_from("/stats", "10.0.0.1:1")).await.unwrap();
    assert_eq!(body_text(response).await, r#"{"unique_ips":0}"#);
}

#[tokio::test]
async fn missing_context_carrier_is_server_error() {
    // Route wired without the client-IP middleware.
    let app = Router::new().route("/whoami", get(api::whoami));

    let response = app.oneshot(get_from("/whoami", "10.0.0.1:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "INTERNAL");
}

struct DownStore;

#[async_trait]
impl CountingStore for DownStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Redis
    }

    async fn increment(&self, _ip: &str) -> Result<u64> {
        Err(IpCountError::BackendUnavailable("connection refused".into()))
    }

    async fn unique_count(&self) -> Result<u64> {
        Err(IpCountError::BackendUnavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<()> {
        Err(IpCountError::BackendUnavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn backend_failures_are_plain_server_errors() {
    let app = build_router(AppState::new(ServiceConfig::default(), Arc::new(DownStore)));

    let response = app.clone().oneshot(get_from("/visit", "10.0.0.1:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "BACKEND_UNAVAILABLE");

    let response = app.clone().oneshot(get_from("/stats", "10.0.0.1:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app.clone().oneshot(get_from("/readyz", "10.0.0.1:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Liveness does not depend on the store.
    let response = app.oneshot(get_from("/health", "10.0.0.1:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn readyz_and_metrics_with_memory_store() {
    let app = memory_app();

    let response = app.clone().oneshot(get_from("/readyz", "10.0.0.1:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ready");

    app.clone().oneshot(get_from("/visit", "10.0.0.1:1")).await.unwrap();
    app.clone().oneshot(get_without_peer("/visit")).await.unwrap();

    let response = app.oneshot(get_from("/metrics", "10.0.0.1:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains(r#"ipcount_http_requests_total{route="/visit",status="200"} 1"#), "{text}");
    assert!(text.contains(r#"ipcount_http_requests_total{route="/visit",status="400"} 1"#), "{text}");
    assert!(text.contains(r#"ipcount_store_ops_total{op="increment",outcome="ok"} 1"#), "{text}");
    assert!(text.contains("ipcount_store_reachable 1"), "{text}");
}

struct SlowStore;

#[async_trait]
impl CountingStore for SlowStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Redis
    }

    async fn increment(&self, _ip: &str) -> Result<u64> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(1)
    }

    async fn unique_count(&self) -> Result<u64> {
        Ok(0)
    }
}

#[tokio::test(start_paused = true)]
async fn slow_store_hits_request_deadline() {
    let mut cfg = ServiceConfig::default();
    cfg.server.request_timeout_ms = 100;
    let app = build_router(AppState::new(cfg, Arc::new(SlowStore)));

    let response = app.oneshot(get_from("/visit", "10.0.0.1:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

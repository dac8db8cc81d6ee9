//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness, no store dependency
//! - `/readyz`  : readiness (503 while the counting backend is unreachable)
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use ipcount_core::protocol::HealthResponse;

use crate::api::json_ok;
use crate::app_state::AppState;
use crate::error::ApiResult;

pub async fn health() -> ApiResult<Response> {
    json_ok(&HealthResponse::healthy()).inspect_err(|e| {
        tracing::error!(error = %e, "encode health response failed");
    })
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(store = state.store().kind().as_str(), error = %e, "readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "backend unavailable")
        }
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let store = state.store();
    let reachable = u64::from(store.ping().await.is_ok());
    let body = state.metrics().render(&[("ipcount_store_reachable", reachable)]);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

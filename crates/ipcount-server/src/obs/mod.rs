//! Lightweight in-process metrics.
//!
//! Series are stored as atomics and rendered by the `/metrics` handler in
//! Prometheus text format.

pub mod metrics;

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

/// Middleware: count every response by matched route and status.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    state
        .metrics()
        .http_requests
        .inc(&[("route", route.as_str()), ("status", status.as_str())]);
    tracing::debug!(%route, status = status.as_u16(), elapsed_us = started.elapsed().as_micros() as u64, "request done");
    response
}

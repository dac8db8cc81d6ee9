//! Axum router wiring.
//!
//! Every route runs behind the client-IP middleware, so handlers can rely on
//! the caller IP being in the request context.

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{api, app_state::AppState, context, obs, ops};

pub fn build_router(state: AppState) -> Router {
    let request_timeout = Duration::from_millis(state.cfg().server.request_timeout_ms);

    Router::new()
        .route("/health", get(ops::health))
        .route("/whoami", get(api::whoami))
        .route("/visit", get(api::visit))
        .route("/stats", get(api::stats))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .route_layer(middleware::from_fn(context::attach_client_ip))
        .route_layer(middleware::from_fn_with_state(state.clone(), obs::track_requests))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

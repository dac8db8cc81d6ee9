use axum::{extract::State, response::Response};

use ipcount_core::protocol::{StatsResponse, VisitResponse, WhoamiResponse};

use super::json_ok;
use crate::app_state::AppState;
use crate::context::CallerIp;
use crate::error::{ApiError, ApiResult};

/// `GET /whoami`: the caller IP as seen by the service.
pub async fn whoami(CallerIp(ip): CallerIp) -> ApiResult<Response> {
    json_ok(&WhoamiResponse { ip })
}

/// `GET /visit`: record one visit for the caller and return its running count.
#[tracing::instrument(skip(state))]
pub async fn visit(State(state): State<AppState>, caller: CallerIp) -> ApiResult<Response> {
    let CallerIp(ip) = caller;
    let visits = state.record_visit(&ip).await.map_err(|e| {
        tracing::error!(error = %e, "update ip visits failed");
        ApiError(e)
    })?;
    json_ok(&VisitResponse { ip, visits })
}

/// `GET /stats`: number of distinct IPs seen so far.
#[tracing::instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> ApiResult<Response> {
    let unique_ips = state.unique_ips().await.map_err(|e| {
        tracing::error!(error = %e, "read unique ip count failed");
        ApiError(e)
    })?;
    json_ok(&StatsResponse { unique_ips })
}

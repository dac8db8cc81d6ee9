//! Counting endpoints: `/whoami`, `/visit`, `/stats`.

pub mod visits;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use ipcount_core::error::IpCountError;

use crate::error::ApiResult;

pub use visits::{stats, visit, whoami};

/// Serialize a full success payload. Encoding happens before any byte is
/// written, so a failure still yields a clean 500.
pub(crate) fn json_ok<T: Serialize>(payload: &T) -> ApiResult<Response> {
    let body = serde_json::to_vec(payload).map_err(|e| {
        tracing::error!(error = %e, "encode response failed");
        IpCountError::Encoding(e.to_string())
    })?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

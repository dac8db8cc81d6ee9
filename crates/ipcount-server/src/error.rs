//! HTTP mapping of `IpCountError`.
//!
//! Failures answer with a bare status and the stable client code as plain
//! text. A JSON body is only ever written for a complete success payload.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use ipcount_core::error::IpCountError;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub IpCountError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_fault() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.0.client_code().as_str(),
        )
            .into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

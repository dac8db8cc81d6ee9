use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, FromRequestParts, Request},
    http::{request::Parts, Extensions},
    middleware::Next,
    response::{IntoResponse, Response},
};

use ipcount_core::error::{IpCountError, Result as CoreResult};
use ipcount_core::ip::{client_ip_from_socket, split_host_port};

use crate::error::ApiError;

/// Request-scoped carrier for the caller IP. Private so nothing outside this
/// module can insert or shadow it.
#[derive(Debug, Clone)]
struct ClientIp(Arc<str>);

/// Caller IP from the transport's peer address. A server started without
/// connect info has no peer, which is treated as an empty address.
fn peer_ip(extensions: &Extensions) -> CoreResult<String> {
    match extensions.get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => client_ip_from_socket(addr),
        None => split_host_port("").map(str::to_owned),
    }
}

/// Middleware: derive the caller IP once and attach it to the request.
///
/// Malformed addresses short-circuit with 400 before any handler or store
/// call.
pub async fn attach_client_ip(mut request: Request, next: Next) -> Response {
    let ip = match peer_ip(request.extensions()) {
        Ok(host) => Arc::<str>::from(host),
        Err(e) => {
            tracing::info!(error = %e, "rejecting request with bad remote address");
            return ApiError::from(e).into_response();
        }
    };

    request.extensions_mut().insert(ClientIp(ip));
    next.run(request).await
}

/// Caller IP attached by [`attach_client_ip`], if any.
pub fn client_ip(extensions: &Extensions) -> Option<String> {
    extensions.get::<ClientIp>().map(|ClientIp(ip)| ip.to_string())
}

/// Extractor for handlers that need the caller IP.
///
/// A missing carrier means the middleware did not run for this route, which
/// is a wiring bug and answers 500.
#[derive(Debug, Clone)]
pub struct CallerIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CallerIp
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match client_ip(&parts.extensions) {
            Some(ip) => Ok(CallerIp(ip)),
            None => {
                tracing::error!(path = %parts.uri.path(), "client ip missing from request context");
                Err(ApiError(IpCountError::ContextInvariant("client ip")))
            }
        }
    }
}

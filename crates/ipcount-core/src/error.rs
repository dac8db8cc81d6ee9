//! Shared error type across ipcount crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed remote address.
    BadRequest,
    /// Counting backend unreachable or misbehaving.
    BackendUnavailable,
    /// Invalid configuration.
    Config,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in error bodies and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::BackendUnavailable => "BACKEND_UNAVAILABLE",
            ClientCode::Config => "CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, IpCountError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum IpCountError {
    /// The connection address could not be split into host and port.
    #[error("bad remote address: {0}")]
    AddressFormat(String),
    /// A pipeline stage expected the caller IP in the request context.
    #[error("request context missing {0}")]
    ContextInvariant(&'static str),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("encoding failed: {0}")]
    Encoding(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl IpCountError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            IpCountError::AddressFormat(_) => ClientCode::BadRequest,
            IpCountError::BackendUnavailable(_) => ClientCode::BackendUnavailable,
            IpCountError::Config(_) => ClientCode::Config,
            IpCountError::ContextInvariant(_) | IpCountError::Encoding(_) | IpCountError::Io(_) => {
                ClientCode::Internal
            }
        }
    }

    /// True when the caller sent something we cannot serve (4xx), false when
    /// the failure is on our side.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, IpCountError::AddressFormat(_))
    }
}

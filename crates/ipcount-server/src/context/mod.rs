//! Request-scoped context shared across pipeline stages.
//!
//! The caller IP is derived once by middleware and read by handlers through
//! the `CallerIp` extractor.

pub mod client_ip;

pub use client_ip::{attach_client_ip, client_ip, CallerIp};

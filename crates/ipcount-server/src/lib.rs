//! ipcount server library entry.
//!
//! Wires config, the counting store, request context propagation and the HTTP
//! handlers into one axum application. Consumed by the binary (`main.rs`) and
//! by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod context;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod store;

#[cfg(test)]
mod test_support;

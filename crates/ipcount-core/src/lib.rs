//! ipcount core: transport-agnostic primitives shared by the server and tests.
//!
//! This crate holds the error taxonomy, the client address extractor and the
//! JSON payload shapes of the HTTP surface. It carries no runtime or transport
//! dependencies so it can be exercised without a server.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed addresses surface as `IpCountError::AddressFormat`, never as a
//! crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod ip;
pub mod protocol;

/// Shared result type.
pub use error::{ClientCode, IpCountError, Result};

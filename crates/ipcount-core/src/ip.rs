//! Client address extraction.
//!
//! The IP key is the host portion of the connection's `host:port` address.
//! IPv6 hosts must be bracketed (`[::1]:443`); the brackets are stripped.

use std::net::SocketAddr;

use crate::error::{IpCountError, Result};

/// Split `host:port` and return the host.
///
/// The port is only required to be present, not to be numeric. Any input that
/// cannot be split unambiguously yields `AddressFormat`.
pub fn split_host_port(addr: &str) -> Result<&str> {
    let bad = |why: &str| IpCountError::AddressFormat(format!("{why}: {addr:?}"));

    if let Some(rest) = addr.strip_prefix('[') {
        let end = rest.find(']').ok_or_else(|| bad("missing ']'"))?;
        let host = &rest[..end];
        let tail = &rest[end + 1..];
        if !tail.starts_with(':') {
            return Err(bad("missing port"));
        }
        let port = &tail[1..];
        if port.contains(':') || host.contains('[') || host.contains(']') {
            return Err(bad("too many colons"));
        }
        if port.contains('[') || port.contains(']') {
            return Err(bad("unexpected bracket"));
        }
        if host.is_empty() {
            return Err(bad("empty host"));
        }
        return Ok(host);
    }

    let (host, port) = addr.rsplit_once(':').ok_or_else(|| bad("missing port"))?;
    if host.contains(':') {
        return Err(bad("too many colons"));
    }
    if host.contains('[') || host.contains(']') || port.contains('[') || port.contains(']') {
        return Err(bad("unexpected bracket"));
    }
    if host.is_empty() {
        return Err(bad("empty host"));
    }
    Ok(host)
}

/// IP key for a peer socket address.
pub fn client_ip_from_socket(addr: &SocketAddr) -> Result<String> {
    let rendered = addr.to_string();
    split_host_port(&rendered).map(str::to_owned)
}

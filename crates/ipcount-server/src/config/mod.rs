//! Service config loader (strict YAML, then environment overrides).

pub mod schema;

use std::fs;
use std::path::Path;

use ipcount_core::error::{IpCountError, Result};

pub use schema::{RedisSection, ServerSection, ServiceConfig, StoreKind, StoreSection};

/// Config file used when `IPCOUNT_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "ipcount.yaml";

/// Resolve the process configuration: optional YAML file, then env overrides.
pub fn load() -> Result<ServiceConfig> {
    let explicit = std::env::var("IPCOUNT_CONFIG").ok();
    let mut cfg = match explicit.as_deref() {
        Some(path) => load_from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_from_file(DEFAULT_CONFIG_PATH)?,
        None => {
            tracing::info!("no config file found, using defaults");
            ServiceConfig::default()
        }
    };
    apply_env(&mut cfg, |k| std::env::var(k).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| IpCountError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| IpCountError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Apply `PORT`, `STORE_TYPE`, `REDIS_ADDR` and `REDIS_PASSWORD`.
///
/// Empty values are ignored so an exported-but-blank variable keeps the
/// file/default value.
pub fn apply_env<F>(cfg: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = get("PORT") {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|e| IpCountError::Config(format!("PORT {port:?} is not a port number: {e}")))?;
        cfg.server.set_port(port)?;
    }
    if let Some(kind) = get("STORE_TYPE") {
        cfg.store.kind = kind.parse()?;
    }
    if let Some(addr) = get("REDIS_ADDR") {
        cfg.store.redis.addr = addr;
    }
    if let Some(password) = get("REDIS_PASSWORD") {
        cfg.store.redis.password = Some(password);
    }
    Ok(())
}

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use ipcount_core::error::{IpCountError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub store: StoreSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            store: StoreSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(IpCountError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.store.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Overall per-request deadline.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(100..=120_000).contains(&self.request_timeout_ms) {
            return Err(IpCountError::Config(
                "server.request_timeout_ms must be between 100 and 120000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            IpCountError::Config(format!("server.listen {:?} is not a socket address: {e}", self.listen))
        })
    }

    /// Replace the port of `listen`, keeping the host.
    pub fn set_port(&mut self, port: u16) -> Result<()> {
        let mut addr = self.listen_addr()?;
        addr.set_port(port);
        self.listen = addr.to_string();
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

/// Which counting backend to run against. Fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    Redis,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Redis => "redis",
        }
    }
}

impl std::str::FromStr for StoreKind {
    type Err = IpCountError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "redis" => Ok(StoreKind::Redis),
            other => Err(IpCountError::Config(format!("unknown store kind: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub kind: StoreKind,

    #[serde(default)]
    pub redis: RedisSection,
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.kind == StoreKind::Redis {
            self.redis.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisSection {
    /// `host:port`, or a full `redis://` URL.
    #[serde(default = "default_redis_addr")]
    pub addr: String,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub db: i64,

    /// Hash holding one field per IP.
    #[serde(default = "default_hash_key")]
    pub hash_key: String,

    /// Abort startup when the backend does not answer PING.
    #[serde(default = "default_require_on_startup")]
    pub require_on_startup: bool,

    /// Bound on establishing the connection (TCP plus handshake).
    #[serde(default = "default_redis_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Bound on a single command round trip.
    #[serde(default = "default_redis_timeout_ms")]
    pub response_timeout_ms: u64,
}

impl Default for RedisSection {
    fn default() -> Self {
        Self {
            addr: default_redis_addr(),
            password: None,
            db: 0,
            hash_key: default_hash_key(),
            require_on_startup: default_require_on_startup(),
            connect_timeout_ms: default_redis_timeout_ms(),
            response_timeout_ms: default_redis_timeout_ms(),
        }
    }
}

impl RedisSection {
    pub fn validate(&self) -> Result<()> {
        if self.addr.trim().is_empty() {
            return Err(IpCountError::Config("store.redis.addr must not be empty".into()));
        }
        if self.hash_key.is_empty() {
            return Err(IpCountError::Config("store.redis.hash_key must not be empty".into()));
        }
        if self.db < 0 {
            return Err(IpCountError::Config("store.redis.db must not be negative".into()));
        }
        for (name, ms) in [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("response_timeout_ms", self.response_timeout_ms),
        ] {
            if !(10..=60_000).contains(&ms) {
                return Err(IpCountError::Config(format!(
                    "store.redis.{name} must be between 10 and 60000"
                )));
            }
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

fn default_redis_addr() -> String {
    "localhost:6379".into()
}
fn default_hash_key() -> String {
    "ip".into()
}
fn default_require_on_startup() -> bool {
    true
}
fn default_redis_timeout_ms() -> u64 {
    2_000
}

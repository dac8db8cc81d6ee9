//! Shared counters in a single Redis hash (`HINCRBY` / `HLEN`).
//!
//! Each IP is a field of the hash; its value is the running count. Atomicity
//! per field is Redis's. The two operations never need to agree with each
//! other, so no MULTI/transaction is used.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, IntoConnectionInfo, RedisError, RedisResult};
use tokio::sync::Mutex;

use ipcount_core::error::{IpCountError, Result};

use super::{ensure_key, CountingStore};
use crate::config::{RedisSection, StoreKind};

// One retry at 200ms for the initial connect; request paths do not retry.
const CONNECT_BACKOFF_BASE: u64 = 2;
const CONNECT_BACKOFF_FACTOR_MS: u64 = 100;
const CONNECT_RETRIES: usize = 1;

fn backend(e: RedisError) -> IpCountError {
    IpCountError::BackendUnavailable(e.to_string())
}

/// Run `fut`, mapping both a Redis error and an elapsed deadline to
/// `BackendUnavailable`.
async fn bounded<T>(what: &str, limit: Duration, fut: impl Future<Output = RedisResult<T>>) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res.map_err(backend),
        Err(_) => Err(IpCountError::BackendUnavailable(format!(
            "redis {what} timed out after {}ms",
            limit.as_millis()
        ))),
    }
}

pub struct RedisCounter {
    client: redis::Client,
    hash_key: String,
    connect_timeout: Duration,
    response_timeout: Duration,
    conn: Mutex<Option<ConnectionManager>>,
}

impl RedisCounter {
    /// Build the client without connecting. The connection is established on
    /// first use and then reused; `ConnectionManager` reconnects on its own
    /// after a broken pipe.
    pub fn open(cfg: &RedisSection) -> Result<Self> {
        let url = if cfg.addr.contains("://") {
            cfg.addr.clone()
        } else {
            format!("redis://{}/{}", cfg.addr, cfg.db)
        };
        let mut info = url
            .as_str()
            .into_connection_info()
            .map_err(|e| IpCountError::Config(format!("store.redis.addr: {e}")))?;
        if let Some(password) = &cfg.password {
            info.redis.password = Some(password.clone());
        }

        let client = redis::Client::open(info)
            .map_err(|e| IpCountError::Config(format!("store.redis: {e}")))?;

        Ok(Self {
            client,
            hash_key: cfg.hash_key.clone(),
            connect_timeout: cfg.connect_timeout(),
            response_timeout: cfg.response_timeout(),
            conn: Mutex::new(None),
        })
    }

    /// Shared connection, created on first use.
    ///
    /// The slot lock is held while connecting so concurrent callers do not
    /// race to open several connections; `connect_timeout` caps how long they
    /// queue behind a backend that never answers.
    async fn connection(&self) -> Result<ConnectionManager> {
        let mut slot = self.conn.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = bounded(
            "connect",
            self.connect_timeout,
            ConnectionManager::new_with_backoff_and_timeouts(
                self.client.clone(),
                CONNECT_BACKOFF_BASE,
                CONNECT_BACKOFF_FACTOR_MS,
                CONNECT_RETRIES,
                self.response_timeout,
                self.connect_timeout,
            ),
        )
        .await?;
        tracing::debug!(hash = %self.hash_key, "redis connection established");
        *slot = Some(conn.clone());
        Ok(conn)
    }
}

#[async_trait]
impl CountingStore for RedisCounter {
    fn kind(&self) -> StoreKind {
        StoreKind::Redis
    }

    async fn increment(&self, ip: &str) -> Result<u64> {
        ensure_key(ip)?;
        let mut conn = self.connection().await?;
        bounded("HINCRBY", self.response_timeout, conn.hincr(&self.hash_key, ip, 1u64)).await
    }

    async fn unique_count(&self) -> Result<u64> {
        let mut conn = self.connection().await?;
        bounded("HLEN", self.response_timeout, conn.hlen(&self.hash_key)).await
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let pong: String = bounded(
            "PING",
            self.response_timeout,
            redis::cmd("PING").query_async(&mut conn),
        )
        .await?;
        if pong != "PONG" {
            return Err(IpCountError::BackendUnavailable(format!("unexpected PING reply: {pong}")));
        }
        Ok(())
    }
}

//! Counting store: per-IP visit counters plus distinct-IP cardinality.
//!
//! Handlers only see `Arc<dyn CountingStore>`. The concrete backend is picked
//! once at startup by [`build_store`] and never switched afterwards.

pub mod memory;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;

use ipcount_core::error::{IpCountError, Result};

use crate::config::{StoreKind, StoreSection};

pub use memory::MemoryCounter;
pub use self::redis::RedisCounter;

/// Atomic per-key increment and distinct-key count.
#[async_trait]
pub trait CountingStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Add one visit for `ip` and return the count after the increment.
    /// An unseen key starts at 0, so its first increment returns 1.
    async fn increment(&self, ip: &str) -> Result<u64>;

    /// Number of distinct keys with at least one visit.
    async fn unique_count(&self) -> Result<u64>;

    /// Backend reachability. Local stores are always reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

pub(crate) fn ensure_key(ip: &str) -> Result<()> {
    if ip.is_empty() {
        return Err(IpCountError::AddressFormat("empty ip key".into()));
    }
    Ok(())
}

/// Construct the configured store and probe it.
///
/// With `store.redis.require_on_startup` a failed probe aborts startup;
/// otherwise it is logged and the service runs degraded until the backend
/// answers.
pub async fn build_store(cfg: &StoreSection) -> Result<Arc<dyn CountingStore>> {
    let store: Arc<dyn CountingStore> = match cfg.kind {
        StoreKind::Memory => Arc::new(MemoryCounter::new()),
        StoreKind::Redis => Arc::new(RedisCounter::open(&cfg.redis)?),
    };

    if let Err(e) = store.ping().await {
        if cfg.kind == StoreKind::Redis && cfg.redis.require_on_startup {
            return Err(e);
        }
        tracing::warn!(store = store.kind().as_str(), error = %e, "store probe failed, starting degraded");
    } else {
        tracing::info!(store = store.kind().as_str(), "counting store ready");
    }

    Ok(store)
}

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ipcount_core::error::Result;

use super::{ensure_key, CountingStore};
use crate::config::StoreKind;

/// Process-local counters behind one reader/writer lock.
///
/// Increments take the write lock for the whole read-modify-write, so updates
/// to any key are serialized. `unique_count` takes the read lock and sees the
/// map either before or after a concurrent insert, never in between.
#[derive(Debug, Default)]
pub struct MemoryCounter {
    visits: RwLock<HashMap<String, u64>>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CountingStore for MemoryCounter {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn increment(&self, ip: &str) -> Result<u64> {
        ensure_key(ip)?;
        let mut visits = self.visits.write().await;
        if let Some(count) = visits.get_mut(ip) {
            *count += 1;
            return Ok(*count);
        }
        visits.insert(ip.to_owned(), 1);
        Ok(1)
    }

    async fn unique_count(&self) -> Result<u64> {
        let visits = self.visits.read().await;
        Ok(visits.len() as u64)
    }
}

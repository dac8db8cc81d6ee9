//! Shared application state.
//!
//! One counting store per process, injected here at startup and handed to
//! every handler through axum `State`. Nothing reaches the store through a
//! global.

use std::sync::Arc;
use std::time::Instant;

use ipcount_core::error::Result;

use crate::config::ServiceConfig;
use crate::obs::metrics::ServiceMetrics;
use crate::store::{self, CountingStore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    store: Arc<dyn CountingStore>,
    metrics: ServiceMetrics,
}

impl AppState {
    pub fn new(cfg: ServiceConfig, store: Arc<dyn CountingStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                store,
                metrics: ServiceMetrics::default(),
            }),
        }
    }

    /// Build the configured store (probing it) and wrap it in state.
    /// Returns Result so main can report startup errors without panicking.
    pub async fn from_config(cfg: ServiceConfig) -> Result<Self> {
        let store = store::build_store(&cfg.store).await?;
        Ok(Self::new(cfg, store))
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> Arc<dyn CountingStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.inner.metrics
    }

    pub async fn record_visit(&self, ip: &str) -> Result<u64> {
        let started = Instant::now();
        let res = self.inner.store.increment(ip).await;
        self.inner.metrics.record_store("increment", &res, started.elapsed());
        res
    }

    pub async fn unique_ips(&self) -> Result<u64> {
        let started = Instant::now();
        let res = self.inner.store.unique_count().await;
        self.inner.metrics.record_store("unique_count", &res, started.elapsed());
        res
    }
}

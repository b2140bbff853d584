//! Shared application state for the probe service.
//!
//! Owns the config and the metric registry. The registry is injected rather
//! than global so tests can build an isolated instance per router.

use std::sync::Arc;

use sliprobe_core::error::Result;
use sliprobe_core::metrics::Registry;

use crate::config::ProbeConfig;
use crate::obs::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    http_metrics: HttpMetrics,
}

struct AppStateInner {
    cfg: ProbeConfig,
}

impl AppState {
    /// Build state with a fresh registry.
    pub fn new(cfg: ProbeConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(Registry::new()))
    }

    /// Build state on top of a caller-provided registry. Fails if the HTTP
    /// families are already registered there.
    pub fn with_registry(cfg: ProbeConfig, registry: Arc<Registry>) -> Result<Self> {
        let http_metrics = HttpMetrics::register(registry, &cfg.metrics.latency_buckets)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            http_metrics,
        })
    }

    pub fn cfg(&self) -> &ProbeConfig {
        &self.inner.cfg
    }

    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.http_metrics
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.http_metrics.registry()
    }
}

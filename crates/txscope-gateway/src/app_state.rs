//! Shared application state for the txscope gateway.
//!
//! The metric registry is created here, once, and handed to every component
//! that reads or writes it. Startup errors (duplicate metric, bad upstream
//! client) are returned to the caller rather than panicking.

use std::sync::Arc;

use txscope_core::error::Result;
use txscope_core::metrics::Registry;

use crate::config::GatewayConfig;
use crate::obs::metrics::ServiceMetrics;
use crate::upstream::{HttpTransactionSource, TransactionSource};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    registry: Arc<Registry>,
    metrics: ServiceMetrics,
    transactions: Arc<dyn TransactionSource>,
}

impl AppState {
    /// Build application state with a fresh registry and the HTTP upstream.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let source = HttpTransactionSource::new(&cfg.upstream)?;
        tracing::debug!(url = %source.url(), "upstream configured");
        Self::with_parts(cfg, Arc::new(Registry::new()), Arc::new(source))
    }

    /// Build application state around an existing registry and source.
    pub fn with_parts(
        cfg: GatewayConfig,
        registry: Arc<Registry>,
        transactions: Arc<dyn TransactionSource>,
    ) -> Result<Self> {
        let metrics = ServiceMetrics::register(&registry)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                metrics,
                transactions,
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.inner.metrics
    }

    pub fn transactions(&self) -> Arc<dyn TransactionSource> {
        Arc::clone(&self.inner.transactions)
    }
}

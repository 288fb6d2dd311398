//! The service's metric set.
//!
//! Names and label schemas are a compatibility surface for dashboards and
//! must not change.

use std::sync::Arc;

use txscope_core::error::Result;
use txscope_core::metrics::{CounterVec, Gauge, HistogramVec, Registry, DEFAULT_BUCKETS};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const GOROUTINES_TOTAL: &str = "goroutines_total";
pub const MEMORY_ALLOC_BYTES: &str = "memory_alloc_bytes";
pub const MEMORY_HEAP_BYTES: &str = "memory_heap_bytes";
pub const GC_DURATION_SECONDS: &str = "gc_duration_seconds";

/// Request metrics, updated by the middleware.
#[derive(Clone)]
pub struct HttpMetrics {
    pub requests: Arc<CounterVec>,
    pub duration: Arc<HistogramVec>,
}

/// Runtime gauges, updated by the sampler.
#[derive(Clone)]
pub struct RuntimeGauges {
    pub tasks: Arc<Gauge>,
    pub alloc_bytes: Arc<Gauge>,
    pub heap_bytes: Arc<Gauge>,
    pub last_pause_seconds: Arc<Gauge>,
}

#[derive(Clone)]
pub struct ServiceMetrics {
    pub http: HttpMetrics,
    pub runtime: RuntimeGauges,
}

impl ServiceMetrics {
    /// Register every service metric. Fails on a name clash, which is a
    /// startup configuration error.
    pub fn register(registry: &Registry) -> Result<Self> {
        let http = HttpMetrics {
            requests: registry.counter_vec(
                HTTP_REQUESTS_TOTAL,
                "Total number of HTTP requests",
                &["method", "endpoint", "status"],
            )?,
            duration: registry.histogram_vec(
                HTTP_REQUEST_DURATION_SECONDS,
                "Duration of HTTP requests",
                &["method", "endpoint"],
                &DEFAULT_BUCKETS,
            )?,
        };

        let runtime = RuntimeGauges {
            tasks: registry.gauge(GOROUTINES_TOTAL, "Current number of live runtime tasks")?,
            alloc_bytes: registry.gauge(MEMORY_ALLOC_BYTES, "Current memory allocation in bytes")?,
            heap_bytes: registry.gauge(MEMORY_HEAP_BYTES, "Current heap memory usage in bytes")?,
            last_pause_seconds: registry.gauge(
                GC_DURATION_SECONDS,
                "Duration of the most recent runtime pause",
            )?,
        };

        Ok(Self { http, runtime })
    }
}

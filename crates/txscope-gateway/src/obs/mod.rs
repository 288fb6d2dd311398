//! Observability pipeline.
//!
//! - `metrics`    : the fixed metric set registered at startup
//! - `middleware` : per-request count and latency
//! - `sampler`    : periodic runtime gauges
//! - `probe`      : where the sampler reads runtime statistics from
//! - `alloc`      : allocation-counting global allocator for the binary

pub mod alloc;
pub mod metrics;
pub mod middleware;
pub mod probe;
pub mod sampler;

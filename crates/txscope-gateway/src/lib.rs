//! txscope gateway library entry.
//!
//! Wires config, the metric registry, the observability pipeline (request
//! middleware, runtime sampler), the upstream proxy, and the HTTP router into
//! one service. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod server;
pub mod upstream;

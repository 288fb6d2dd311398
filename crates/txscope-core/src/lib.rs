//! txscope core: error types and the in-process metric registry.
//!
//! This crate owns the metric data model (counters, histograms, gauges) and
//! its Prometheus text rendering. It carries no transport or runtime
//! dependencies so the gateway, tests, and any future sidecar can share one
//! registry implementation.
//!
//! # Panic-free guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Metric updates sit on the request hot path and must never take a
//! request down with them.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{Result, TxScopeError};

//! In-process metric registry.
//!
//! Metrics are registered once at startup under a unique name with a fixed
//! label-key schema, then updated concurrently from request tasks and the
//! runtime sampler. Each metric synchronises its own series (`DashMap` shards
//! plus atomics or a per-series mutex); there is no lock spanning metrics.
//!
//! The registry is an ordinary value: construct it, wrap it in an `Arc`, and
//! hand it to whoever needs it. Tests build isolated registries freely.

mod counter;
mod gauge;
mod histogram;
mod text;

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{Result, TxScopeError};

pub use counter::CounterVec;
pub use gauge::Gauge;
pub use histogram::{HistogramSnapshot, HistogramVec, DEFAULT_BUCKETS};

/// Metric identity: name, help text and label-key schema.
#[derive(Debug, Clone)]
pub struct Desc {
    pub name: String,
    pub help: String,
    pub label_keys: Vec<String>,
}

impl Desc {
    /// Owned series key for a set of label values. Arity mismatches are
    /// dropped with a warning; metric updates never fail the caller.
    pub(crate) fn series_key(&self, label_values: &[&str]) -> Option<Vec<String>> {
        if label_values.len() != self.label_keys.len() {
            tracing::warn!(
                metric = %self.name,
                expected = self.label_keys.len(),
                got = label_values.len(),
                "label value count mismatch; update dropped"
            );
            return None;
        }
        Some(label_values.iter().map(|v| v.to_string()).collect())
    }
}

/// Kind requested at registration time.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricKind {
    Counter,
    /// Upper bounds must be finite and strictly increasing; the `+Inf`
    /// bucket is implicit.
    Histogram { buckets: Vec<f64> },
    Gauge,
}

/// Handle returned by [`Registry::register`].
#[derive(Clone)]
pub enum MetricHandle {
    Counter(Arc<CounterVec>),
    Histogram(Arc<HistogramVec>),
    Gauge(Arc<Gauge>),
}

impl MetricHandle {
    pub fn desc(&self) -> &Desc {
        match self {
            MetricHandle::Counter(c) => c.desc(),
            MetricHandle::Histogram(h) => h.desc(),
            MetricHandle::Gauge(g) => g.desc(),
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            MetricHandle::Counter(c) => c.render(out),
            MetricHandle::Histogram(h) => h.render(out),
            MetricHandle::Gauge(g) => g.render(out),
        }
    }
}

#[derive(Default)]
pub struct Registry {
    metrics: DashMap<String, MetricHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metric. Names are unique for the registry's lifetime.
    pub fn register(
        &self,
        name: &str,
        help: &str,
        kind: MetricKind,
        label_keys: &[&str],
    ) -> Result<MetricHandle> {
        validate(name, &kind, label_keys)?;

        let desc = Desc {
            name: name.to_string(),
            help: help.to_string(),
            label_keys: label_keys.iter().map(|k| k.to_string()).collect(),
        };

        match self.metrics.entry(name.to_string()) {
            Entry::Occupied(_) => Err(TxScopeError::DuplicateMetric(name.to_string())),
            Entry::Vacant(slot) => {
                let handle = match kind {
                    MetricKind::Counter => MetricHandle::Counter(Arc::new(CounterVec::new(desc))),
                    MetricKind::Histogram { buckets } => {
                        MetricHandle::Histogram(Arc::new(HistogramVec::new(desc, buckets)))
                    }
                    MetricKind::Gauge => MetricHandle::Gauge(Arc::new(Gauge::new(desc))),
                };
                slot.insert(handle.clone());
                tracing::debug!(metric = %name, "metric registered");
                Ok(handle)
            }
        }
    }

    pub fn counter_vec(&self, name: &str, help: &str, label_keys: &[&str]) -> Result<Arc<CounterVec>> {
        match self.register(name, help, MetricKind::Counter, label_keys)? {
            MetricHandle::Counter(c) => Ok(c),
            _ => Err(TxScopeError::Internal(format!("{name}: registered with another kind"))),
        }
    }

    pub fn histogram_vec(
        &self,
        name: &str,
        help: &str,
        label_keys: &[&str],
        buckets: &[f64],
    ) -> Result<Arc<HistogramVec>> {
        let kind = MetricKind::Histogram { buckets: buckets.to_vec() };
        match self.register(name, help, kind, label_keys)? {
            MetricHandle::Histogram(h) => Ok(h),
            _ => Err(TxScopeError::Internal(format!("{name}: registered with another kind"))),
        }
    }

    pub fn gauge(&self, name: &str, help: &str) -> Result<Arc<Gauge>> {
        match self.register(name, help, MetricKind::Gauge, &[])? {
            MetricHandle::Gauge(g) => Ok(g),
            _ => Err(TxScopeError::Internal(format!("{name}: registered with another kind"))),
        }
    }

    pub fn get(&self, name: &str) -> Option<MetricHandle> {
        self.metrics.get(name).map(|m| m.value().clone())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Render every metric in Prometheus text exposition format.
    ///
    /// Output is sorted by metric name, then by label values, so two renders
    /// of the same state are byte-identical. Each series is read atomically;
    /// different metrics may be read at slightly different instants.
    pub fn render(&self) -> String {
        let mut handles: Vec<MetricHandle> = self.metrics.iter().map(|r| r.value().clone()).collect();
        handles.sort_by(|a, b| a.desc().name.cmp(&b.desc().name));

        let mut out = String::new();
        for h in &handles {
            h.render(&mut out);
        }
        out
    }
}

fn validate(name: &str, kind: &MetricKind, label_keys: &[&str]) -> Result<()> {
    if !text::is_metric_name(name) {
        return Err(TxScopeError::InvalidMetric(format!("bad metric name: {name:?}")));
    }
    for (i, key) in label_keys.iter().enumerate() {
        if !text::is_label_key(key) {
            return Err(TxScopeError::InvalidMetric(format!("{name}: bad label key {key:?}")));
        }
        if label_keys[..i].contains(key) {
            return Err(TxScopeError::InvalidMetric(format!("{name}: duplicate label key {key:?}")));
        }
    }
    match kind {
        MetricKind::Counter => {}
        MetricKind::Gauge => {
            if !label_keys.is_empty() {
                return Err(TxScopeError::InvalidMetric(format!("{name}: gauges are label-free")));
            }
        }
        MetricKind::Histogram { buckets } => {
            if label_keys.contains(&"le") {
                return Err(TxScopeError::InvalidMetric(format!("{name}: `le` is reserved")));
            }
            if buckets.iter().any(|b| !b.is_finite()) {
                return Err(TxScopeError::InvalidMetric(format!("{name}: bucket bounds must be finite")));
            }
            if buckets.windows(2).any(|w| w[0] >= w[1]) {
                return Err(TxScopeError::InvalidMetric(format!(
                    "{name}: bucket bounds must be strictly increasing"
                )));
            }
        }
    }
    Ok(())
}

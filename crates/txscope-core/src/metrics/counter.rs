use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::text::{label_block, write_header};
use super::Desc;

/// Monotonic counter family, one `AtomicU64` per label-value combination.
pub struct CounterVec {
    desc: Desc,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub(crate) fn new(desc: Desc) -> Self {
        Self {
            desc,
            map: DashMap::new(),
        }
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Increment by 1.
    pub fn inc(&self, label_values: &[&str]) {
        self.add(label_values, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, label_values: &[&str], v: u64) {
        let Some(key) = self.desc.series_key(label_values) else {
            return;
        };
        if let Some(counter) = self.map.get(&key) {
            counter.fetch_add(v, Ordering::Relaxed);
            return;
        }
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for a label combination (0 when never touched).
    pub fn get(&self, label_values: &[&str]) -> u64 {
        let key: Vec<String> = label_values.iter().map(|v| v.to_string()).collect();
        self.map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    pub(crate) fn render(&self, out: &mut String) {
        let mut series: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        if series.is_empty() {
            return;
        }
        series.sort_by(|a, b| a.0.cmp(&b.0));

        let d = &self.desc;
        write_header(out, &d.name, &d.help, "counter");
        for (values, v) in series {
            out.push_str(&d.name);
            out.push_str(&label_block(&d.label_keys, &values, None));
            out.push(' ');
            out.push_str(&v.to_string());
            out.push('\n');
        }
    }
}

use dashmap::DashMap;
use std::sync::{Mutex, PoisonError};

use super::text::{fmt_float, label_block, write_header};
use super::Desc;

/// Prometheus `DefBuckets` (seconds).
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Point-in-time copy of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper_bound, cumulative_count)` in ascending bound order, `+Inf` excluded.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    pub count: u64,
}

struct SeriesState {
    // Cumulative: buckets[i] counts every observation <= bounds[i].
    buckets: Vec<u64>,
    sum: f64,
    count: u64,
}

/// Histogram family. Each series sits behind its own short-lived mutex so
/// bucket counts, `_sum` and `_count` are always rendered as one unit.
pub struct HistogramVec {
    desc: Desc,
    bounds: Vec<f64>,
    map: DashMap<Vec<String>, Mutex<SeriesState>>,
}

impl HistogramVec {
    pub(crate) fn new(desc: Desc, bounds: Vec<f64>) -> Self {
        Self {
            desc,
            bounds,
            map: DashMap::new(),
        }
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Record one observation: every bucket whose upper bound is >= `v`
    /// is incremented, then `sum` and `count`.
    pub fn observe(&self, label_values: &[&str], v: f64) {
        let Some(key) = self.desc.series_key(label_values) else {
            return;
        };
        if !self.map.contains_key(&key) {
            self.map.entry(key.clone()).or_insert_with(|| {
                Mutex::new(SeriesState {
                    buckets: vec![0; self.bounds.len()],
                    sum: 0.0,
                    count: 0,
                })
            });
        }
        // Series are never removed, so the lookup after insertion always hits.
        let Some(series) = self.map.get(&key) else {
            return;
        };

        let mut st = series.lock().unwrap_or_else(PoisonError::into_inner);
        for (i, &le) in self.bounds.iter().enumerate() {
            if v <= le {
                st.buckets[i] += 1;
            }
        }
        st.sum += v;
        st.count += 1;
    }

    /// Copy of one series, `None` when it has never been observed.
    pub fn snapshot(&self, label_values: &[&str]) -> Option<HistogramSnapshot> {
        let key: Vec<String> = label_values.iter().map(|v| v.to_string()).collect();
        let series = self.map.get(&key)?;
        let st = series.lock().unwrap_or_else(PoisonError::into_inner);
        Some(self.snapshot_of(&st))
    }

    fn snapshot_of(&self, st: &SeriesState) -> HistogramSnapshot {
        HistogramSnapshot {
            buckets: self.bounds.iter().copied().zip(st.buckets.iter().copied()).collect(),
            sum: st.sum,
            count: st.count,
        }
    }

    /// Render in Prometheus text exposition format (`le` last, `+Inf` bucket
    /// equal to `_count`).
    pub(crate) fn render(&self, out: &mut String) {
        let mut series: Vec<(Vec<String>, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| {
                let st = r.value().lock().unwrap_or_else(PoisonError::into_inner);
                (r.key().clone(), self.snapshot_of(&st))
            })
            .collect();
        if series.is_empty() {
            return;
        }
        series.sort_by(|a, b| a.0.cmp(&b.0));

        let d = &self.desc;
        write_header(out, &d.name, &d.help, "histogram");
        for (values, snap) in series {
            for (le, count) in &snap.buckets {
                let labels = label_block(&d.label_keys, &values, Some(("le", &fmt_float(*le))));
                out.push_str(&format!("{}_bucket{} {}\n", d.name, labels, count));
            }
            let labels = label_block(&d.label_keys, &values, Some(("le", "+Inf")));
            out.push_str(&format!("{}_bucket{} {}\n", d.name, labels, snap.count));

            let labels = label_block(&d.label_keys, &values, None);
            out.push_str(&format!("{}_sum{} {}\n", d.name, labels, fmt_float(snap.sum)));
            out.push_str(&format!("{}_count{} {}\n", d.name, labels, snap.count));
        }
    }
}

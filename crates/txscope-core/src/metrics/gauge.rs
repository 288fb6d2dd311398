use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use super::text::{fmt_float, write_header};
use super::Desc;

/// Label-free scalar. The `f64` is stored as raw bits so reads are never torn.
pub struct Gauge {
    desc: Desc,
    bits: AtomicU64,
}

impl Gauge {
    pub(crate) fn new(desc: Desc) -> Self {
        Self {
            desc,
            bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Overwrite the current value.
    pub fn set(&self, v: f64) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub(crate) fn render(&self, out: &mut String) {
        let d = &self.desc;
        write_header(out, &d.name, &d.help, "gauge");
        let _ = writeln!(out, "{} {}", d.name, fmt_float(self.get()));
    }
}

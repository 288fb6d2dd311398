//! Runtime statistics source for the sampler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use txscope_core::error::{Result, TxScopeError};

use super::alloc;

/// One read of the process runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeSnapshot {
    /// Live tasks on the tokio runtime.
    pub tasks: usize,
    pub alloc_bytes: u64,
    pub heap_bytes: u64,
    pub last_pause: Duration,
}

pub trait RuntimeProbe: Send + Sync {
    fn snapshot(&self) -> Result<RuntimeSnapshot>;

    /// Feed a runtime pause (how late a scheduled tick was woken) into the
    /// probe's pause history. Probes without a history ignore it.
    fn record_pause(&self, _pause: Duration) {}
}

pub const PAUSE_HISTORY_LEN: usize = 256;

/// Circular buffer of the last [`PAUSE_HISTORY_LEN`] pauses, in nanoseconds.
///
/// Single writer (the sampler task); any number of readers.
pub struct PauseHistory {
    slots: [AtomicU64; PAUSE_HISTORY_LEN],
    written: AtomicU64,
}

impl Default for PauseHistory {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| AtomicU64::new(0)),
            written: AtomicU64::new(0),
        }
    }
}

impl PauseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, pause: Duration) {
        let n = self.written.load(Ordering::Relaxed);
        let nanos = u64::try_from(pause.as_nanos()).unwrap_or(u64::MAX);
        self.slots[(n % PAUSE_HISTORY_LEN as u64) as usize].store(nanos, Ordering::Relaxed);
        self.written.store(n + 1, Ordering::Release);
    }

    /// Total pauses recorded since creation.
    pub fn count(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    /// Most recently written slot, `(n + 255) % 256`; zero before the first
    /// record.
    pub fn last(&self) -> Duration {
        let n = self.count();
        if n == 0 {
            return Duration::ZERO;
        }
        let idx = ((n + PAUSE_HISTORY_LEN as u64 - 1) % PAUSE_HISTORY_LEN as u64) as usize;
        Duration::from_nanos(self.slots[idx].load(Ordering::Relaxed))
    }
}

/// Reads the live process: tokio task count, [`alloc::CountingAllocator`]
/// bytes, resident memory and the pause history.
pub struct ProcessProbe {
    handle: Handle,
    pauses: PauseHistory,
}

impl ProcessProbe {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            pauses: PauseHistory::new(),
        }
    }

    /// Probe bound to the runtime the caller is running on.
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| TxScopeError::Internal(format!("no tokio runtime: {e}")))?;
        Ok(Self::new(handle))
    }

    pub fn pauses(&self) -> &PauseHistory {
        &self.pauses
    }
}

impl RuntimeProbe for ProcessProbe {
    fn snapshot(&self) -> Result<RuntimeSnapshot> {
        let alloc_bytes = alloc::allocated_bytes() as u64;
        Ok(RuntimeSnapshot {
            tasks: self.handle.metrics().num_alive_tasks(),
            alloc_bytes,
            heap_bytes: heap_bytes(alloc_bytes)?,
            last_pause: self.pauses.last(),
        })
    }

    fn record_pause(&self, pause: Duration) {
        self.pauses.record(pause);
    }
}

#[cfg(target_os = "linux")]
fn heap_bytes(_alloc_bytes: u64) -> Result<u64> {
    let status = std::fs::read_to_string("/proc/self/status")
        .map_err(|e| TxScopeError::Internal(format!("read /proc/self/status failed: {e}")))?;
    parse_vm_rss(&status)
        .ok_or_else(|| TxScopeError::Internal("VmRSS missing from /proc/self/status".into()))
}

#[cfg(not(target_os = "linux"))]
fn heap_bytes(alloc_bytes: u64) -> Result<u64> {
    Ok(alloc_bytes)
}

/// Resident set size in bytes from a `/proc/<pid>/status` document.
pub fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line
        .trim_start_matches("VmRSS:")
        .trim()
        .trim_end_matches("kB")
        .trim()
        .parse()
        .ok()?;
    Some(kb * 1024)
}

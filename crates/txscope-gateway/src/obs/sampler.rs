//! Periodic runtime sampler.
//!
//! A single background task: every `interval` it reads a [`RuntimeSnapshot`]
//! from its probe and overwrites the four runtime gauges. It never touches
//! request state and stops when the shutdown token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use txscope_core::error::Result;

use super::metrics::RuntimeGauges;
use super::probe::{RuntimeProbe, RuntimeSnapshot};

pub struct RuntimeSampler {
    probe: Arc<dyn RuntimeProbe>,
    gauges: RuntimeGauges,
    interval: Duration,
}

impl RuntimeSampler {
    pub fn new(probe: Arc<dyn RuntimeProbe>, gauges: RuntimeGauges, interval: Duration) -> Self {
        Self {
            probe,
            gauges,
            interval,
        }
    }

    /// Take one sample and publish it.
    pub fn sample_once(&self) -> Result<RuntimeSnapshot> {
        let snap = self.probe.snapshot()?;
        self.gauges.tasks.set(snap.tasks as f64);
        self.gauges.alloc_bytes.set(snap.alloc_bytes as f64);
        self.gauges.heap_bytes.set(snap.heap_bytes as f64);
        self.gauges.last_pause_seconds.set(snap.last_pause.as_secs_f64());
        Ok(snap)
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Tick loop. The first tick fires immediately; missed ticks burst to
    /// catch up rather than being skipped. Cancellation is checked between
    /// ticks, so a tick in progress always completes.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut tick = tokio::time::interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Burst);

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "runtime sampler started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                scheduled = tick.tick() => {
                    self.probe.record_pause(scheduled.elapsed());
                    match self.sample_once() {
                        Ok(snap) => tracing::trace!(
                            tasks = snap.tasks,
                            alloc_bytes = snap.alloc_bytes,
                            heap_bytes = snap.heap_bytes,
                            "runtime sampled"
                        ),
                        Err(e) => tracing::warn!(error = %e, "runtime sample failed; skipping tick"),
                    }
                }
            }
        }

        tracing::info!("runtime sampler stopped");
    }
}

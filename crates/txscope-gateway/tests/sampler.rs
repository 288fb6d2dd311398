//! Runtime sampler: ticking, failure isolation, cancellation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use txscope_core::error::{Result, TxScopeError};
use txscope_core::metrics::Registry;
use txscope_gateway::obs::metrics::ServiceMetrics;
use txscope_gateway::obs::probe::{RuntimeProbe, RuntimeSnapshot};
use txscope_gateway::obs::sampler::RuntimeSampler;

const INTERVAL: Duration = Duration::from_secs(15);

#[derive(Default)]
struct FakeProbe {
    calls: AtomicUsize,
    pauses: AtomicUsize,
    fail_first: bool,
}

impl FakeProbe {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RuntimeProbe for FakeProbe {
    fn snapshot(&self) -> Result<RuntimeSnapshot> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_first && n == 1 {
            return Err(TxScopeError::Internal("probe unavailable".into()));
        }
        Ok(RuntimeSnapshot {
            tasks: n,
            alloc_bytes: 1_000 * n as u64,
            heap_bytes: 2_000 * n as u64,
            last_pause: Duration::from_millis(n as u64),
        })
    }

    fn record_pause(&self, _pause: Duration) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

fn metrics() -> ServiceMetrics {
    ServiceMetrics::register(&Registry::new()).expect("register")
}

#[tokio::test(start_paused = true)]
async fn publishes_gauges_every_interval() {
    let m = metrics();
    let probe = Arc::new(FakeProbe::default());
    let token = CancellationToken::new();
    let handle = RuntimeSampler::new(probe.clone(), m.runtime.clone(), INTERVAL).spawn(token.clone());

    tokio::time::sleep(INTERVAL * 2 + Duration::from_millis(1)).await;

    let n = probe.calls();
    assert!(n >= 2, "expected at least two samples, got {n}");
    assert_eq!(probe.pauses.load(Ordering::SeqCst), n);
    assert_eq!(m.runtime.tasks.get(), n as f64);
    assert_eq!(m.runtime.alloc_bytes.get(), (1_000 * n) as f64);
    assert_eq!(m.runtime.heap_bytes.get(), (2_000 * n) as f64);
    assert_eq!(m.runtime.last_pause_seconds.get(), n as f64 / 1_000.0);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stops_after_cancellation() {
    let m = metrics();
    let probe = Arc::new(FakeProbe::default());
    let token = CancellationToken::new();
    let handle = RuntimeSampler::new(probe.clone(), m.runtime.clone(), INTERVAL).spawn(token.clone());

    tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;
    token.cancel();
    tokio::time::timeout(INTERVAL, handle)
        .await
        .expect("sampler must stop within one interval")
        .unwrap();

    let before = probe.calls();
    tokio::time::sleep(INTERVAL * 4).await;
    assert_eq!(probe.calls(), before);
}

#[tokio::test(start_paused = true)]
async fn failed_tick_does_not_stop_the_loop() {
    let m = metrics();
    let probe = Arc::new(FakeProbe {
        fail_first: true,
        ..FakeProbe::default()
    });
    let token = CancellationToken::new();
    let handle = RuntimeSampler::new(probe.clone(), m.runtime.clone(), INTERVAL).spawn(token.clone());

    tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;

    assert_eq!(probe.calls(), 2);
    assert_eq!(m.runtime.tasks.get(), 2.0);

    token.cancel();
    handle.await.unwrap();
}

#[test]
fn sample_once_leaves_gauges_untouched_on_error() {
    let m = metrics();
    let probe = Arc::new(FakeProbe {
        fail_first: true,
        ..FakeProbe::default()
    });
    let sampler = RuntimeSampler::new(probe, m.runtime.clone(), INTERVAL);

    assert!(sampler.sample_once().is_err());
    assert_eq!(m.runtime.tasks.get(), 0.0);

    let snap = sampler.sample_once().unwrap();
    assert_eq!(snap.tasks, 2);
    assert_eq!(m.runtime.tasks.get(), 2.0);
}

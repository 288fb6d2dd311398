//! txscope gateway
//!
//! - `GET /health`       : liveness
//! - `GET /metrics`      : Prometheus exposition
//! - `GET /transactions` : upstream transaction feed, re-wrapped
//!
//! Config is read from `$TXSCOPE_CONFIG` (default `txscope.yaml`); a missing
//! file means built-in defaults.

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use txscope_gateway::{config, obs::alloc::CountingAllocator, server};

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = match config::load_or_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    match server::run(cfg, server::shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), "gateway failed");
            ExitCode::FAILURE
        }
    }
}

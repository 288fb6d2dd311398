//! Process lifecycle: bind, serve, sample, drain.
//!
//! One `CancellationToken` is the process-wide shutdown signal. Cancelling it
//! stops the runtime sampler and starts axum's graceful shutdown; in-flight
//! requests then get `gateway.shutdown_grace_ms` before the server task is
//! aborted.

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use txscope_core::error::{Result, TxScopeError};

use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::obs::probe::ProcessProbe;
use crate::obs::sampler::RuntimeSampler;
use crate::router;

/// Bind the configured address and serve until `shutdown` resolves.
pub async fn run<F>(cfg: GatewayConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let listen = cfg.gateway.listen_addr()?;
    let state = AppState::new(cfg)?;
    let listener = TcpListener::bind(listen)
        .await
        .map_err(|e| TxScopeError::Internal(format!("bind {listen} failed: {e}")))?;
    serve(listener, state, shutdown).await
}

/// Serve `state` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let addr = listener
        .local_addr()
        .map_err(|e| TxScopeError::Internal(format!("local_addr failed: {e}")))?;
    let token = CancellationToken::new();

    let probe = Arc::new(ProcessProbe::current()?);
    let sampler = RuntimeSampler::new(
        probe,
        state.metrics().runtime.clone(),
        state.cfg().sampler.interval(),
    )
    .spawn(token.clone());

    let grace = state.cfg().gateway.shutdown_grace();
    let app = router::build_router(state);

    tracing::info!(%addr, "txscope-gateway listening");
    tracing::info!("metrics available at http://{addr}/metrics");
    tracing::info!("health check available at http://{addr}/health");

    let stop = token.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop.cancelled().await })
            .await
    });

    let exited_early = tokio::select! {
        res = &mut server => Some(res),
        _ = shutdown => None,
    };
    token.cancel();

    let result = match exited_early {
        Some(res) => flatten(res),
        None => {
            tracing::info!(grace_ms = grace.as_millis() as u64, "beginning graceful shutdown");
            match tokio::time::timeout(grace, &mut server).await {
                Ok(res) => flatten(res),
                Err(_) => {
                    tracing::warn!("grace period elapsed; aborting in-flight requests");
                    server.abort();
                    Ok(())
                }
            }
        }
    };

    if let Err(e) = sampler.await {
        tracing::warn!(error = %e, "runtime sampler ended abnormally");
    }
    tracing::info!("shutdown complete");
    result
}

fn flatten(res: std::result::Result<std::io::Result<()>, tokio::task::JoinError>) -> Result<()> {
    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(TxScopeError::Internal(format!("server failed: {e}"))),
        Err(e) => Err(TxScopeError::Internal(format!("server task failed: {e}"))),
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}

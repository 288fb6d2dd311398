//! Axum router wiring.
//!
//! Layers, outermost first: panic recovery, request tracing, metrics.

use axum::{routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{app_state::AppState, obs, ops, upstream};

pub fn build_router(state: AppState) -> Router {
    let http_metrics = state.metrics().http.clone();

    let routes = Router::new()
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .route("/transactions", get(upstream::fetch_transactions));

    obs::middleware::instrument(routes, http_metrics)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

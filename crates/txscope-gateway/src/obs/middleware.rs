//! Request instrumentation.
//!
//! Every request is counted in `http_requests_total{method,endpoint,status}`
//! and timed in `http_request_duration_seconds{method,endpoint}`. The
//! response passes through untouched.
//!
//! `endpoint` is the matched route template (`/items/:id`), not the raw
//! path, so path parameters cannot explode series cardinality. Requests that
//! match no route share the single [`UNMATCHED_ENDPOINT`] label.
//!
//! Known discrepancy: a handler that panics is recorded with the default
//! captured status (200). The panic is resumed and the outer
//! `CatchPanicLayer` sends the client a 500, so label and client status differ
//! for panicking handlers.

use std::panic::AssertUnwindSafe;

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Router,
};
use futures_util::FutureExt;
use tokio::time::Instant;

use super::metrics::HttpMetrics;

/// `endpoint` label for requests no route matched.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Records the first status code written for a response. Starts at 200,
/// matching a handler that writes a body without setting a status.
#[derive(Debug, Clone, Copy)]
pub struct StatusCapture {
    status: StatusCode,
    written: bool,
}

impl Default for StatusCapture {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            written: false,
        }
    }
}

impl StatusCapture {
    /// First write wins; later writes are ignored.
    pub fn write_header(&mut self, status: StatusCode) {
        if !self.written {
            self.status = status;
            self.written = true;
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Wrap every route (and the fallback) of `router` with [`track_metrics`].
pub fn instrument<S>(router: Router<S>, metrics: HttpMetrics) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(axum::middleware::from_fn_with_state(metrics, track_metrics))
}

pub async fn track_metrics(State(metrics): State<HttpMetrics>, req: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = req.method().as_str().to_owned();
    let endpoint = match req.extensions().get::<MatchedPath>() {
        Some(p) => p.as_str().to_owned(),
        None => UNMATCHED_ENDPOINT.to_owned(),
    };

    let mut capture = StatusCapture::default();
    let outcome = AssertUnwindSafe(next.run(req)).catch_unwind().await;
    if let Ok(resp) = &outcome {
        capture.write_header(resp.status());
    }

    let elapsed = start.elapsed().as_secs_f64();
    let status = capture.status();
    metrics.requests.inc(&[&method, &endpoint, status.as_str()]);
    metrics.duration.observe(&[&method, &endpoint], elapsed);

    match outcome {
        Ok(resp) => resp,
        Err(panic) => {
            tracing::error!(%method, %endpoint, "handler panicked; recorded with captured status");
            std::panic::resume_unwind(panic)
        }
    }
}

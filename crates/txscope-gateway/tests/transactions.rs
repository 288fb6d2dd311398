//! `/transactions` end to end: reshaping, error envelopes, and the metric
//! labels each outcome produces.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use txscope_core::error::{Result, TxScopeError};
use txscope_core::metrics::Registry;
use txscope_gateway::app_state::AppState;
use txscope_gateway::config::{self, GatewayConfig};
use txscope_gateway::router::build_router;
use txscope_gateway::upstream::{Transaction, TransactionSource};

fn record() -> Value {
    json!({
        "block_id": 840000,
        "id": 1012345678,
        "hash": "a1b2c3",
        "date": "2024-04-20",
        "time": "2024-04-20 00:09:27",
        "size": 225,
        "weight": 573,
        "version": 2,
        "lock_time": 839999,
        "is_coinbase": false,
        "has_witness": true,
        "input_count": 1,
        "output_count": 2,
        "input_total": 150000,
        "input_total_usd": 96.5,
        "output_total": 140000,
        "output_total_usd": 90.25,
        "fee": 10000,
        "fee_usd": 6.25,
        "fee_per_kb": 44444.5,
        "fee_per_kb_usd": 28.5,
        "fee_per_kwu": 17452.5,
        "fee_per_kwu_usd": 11.25,
        "cdd_total": 0.5
    })
}

struct FnSource<F>(F);

#[async_trait]
impl<F> TransactionSource for FnSource<F>
where
    F: Fn() -> Result<Vec<Transaction>> + Send + Sync,
{
    async fn fetch(&self) -> Result<Vec<Transaction>> {
        (self.0)()
    }
}

fn app_with<F>(f: F) -> (Router, AppState)
where
    F: Fn() -> Result<Vec<Transaction>> + Send + Sync + 'static,
{
    let state = AppState::with_parts(
        GatewayConfig::default(),
        Arc::new(Registry::new()),
        Arc::new(FnSource(f)),
    )
    .expect("state");
    (build_router(state.clone()), state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    assert_eq!(resp.headers()["content-type"], "application/json");
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn requests(state: &AppState, status: &str) -> u64 {
    state.metrics().http.requests.get(&["GET", "/transactions", status])
}

#[tokio::test]
async fn success_rewraps_records() {
    let (app, state) = app_with(|| Ok(vec![serde_json::from_value(record()).unwrap()]));

    let (status, body) = get_json(app, "/transactions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "data": [record()]}));
    assert_eq!(requests(&state, "200"), 1);
}

#[tokio::test]
async fn empty_result_is_not_found() {
    let (app, state) = app_with(|| Ok(Vec::new()));

    let (status, body) = get_json(app, "/transactions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "No transactions found"}));
    assert_eq!(requests(&state, "404"), 1);
    assert_eq!(requests(&state, "200"), 0);
}

fn refused() -> TxScopeError {
    TxScopeError::Upstream("connection refused".into())
}

fn unavailable() -> TxScopeError {
    TxScopeError::UpstreamStatus(503)
}

fn garbled() -> TxScopeError {
    TxScopeError::Decode("expected value".into())
}

#[tokio::test]
async fn upstream_failures_map_to_distinct_statuses() {
    let cases: [(fn() -> TxScopeError, StatusCode, &str); 3] = [
        (refused, StatusCode::BAD_GATEWAY, "Failed to fetch transactions"),
        (unavailable, StatusCode::BAD_GATEWAY, "Failed to fetch transactions"),
        (garbled, StatusCode::INTERNAL_SERVER_ERROR, "Failed to parse response"),
    ];

    for (make, expected_status, expected_msg) in cases {
        let (app, state) = app_with(move || Err(make()));
        let (status, body) = get_json(app, "/transactions").await;
        assert_eq!(status, expected_status);
        assert_eq!(body, json!({"success": false, "error": expected_msg}));
        assert_eq!(requests(&state, expected_status.as_str()), 1);
    }
}

// --------------------
// Real HTTP upstream
// --------------------

async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/bitcoin/transactions")
}

fn http_app(url: &str, timeout_ms: u64) -> (Router, AppState) {
    let cfg = config::load_from_str(&format!(
        "version: 1\nupstream:\n  url: \"{url}\"\n  timeout_ms: {timeout_ms}\n"
    ))
    .unwrap();
    let state = AppState::new(cfg).unwrap();
    (build_router(state.clone()), state)
}

#[tokio::test]
async fn http_upstream_success() {
    let url = spawn_upstream(Router::new().route(
        "/bitcoin/transactions",
        get(|| async { axum::Json(json!({"data": [record()], "context": {"code": 200}})) }),
    ))
    .await;
    let (app, state) = http_app(&url, 5_000);

    let (status, body) = get_json(app, "/transactions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "data": [record()]}));
    assert_eq!(requests(&state, "200"), 1);
}

#[tokio::test]
async fn http_upstream_empty_and_malformed() {
    let url = spawn_upstream(
        Router::new()
            .route("/bitcoin/transactions", get(|| async { r#"{"data":[]}"# }))
            .route("/broken", get(|| async { "{not json" })),
    )
    .await;

    let (app, state) = http_app(&url, 5_000);
    let (status, body) = get_json(app, "/transactions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "No transactions found"}));
    assert_eq!(requests(&state, "404"), 1);

    let broken = url.replace("/bitcoin/transactions", "/broken");
    let (app, state) = http_app(&broken, 5_000);
    let (status, body) = get_json(app, "/transactions").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to parse response");
    assert_eq!(requests(&state, "500"), 1);
}

#[tokio::test]
async fn http_upstream_error_status_and_timeout() {
    let url = spawn_upstream(
        Router::new()
            .route(
                "/bitcoin/transactions",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down").into_response() }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    r#"{"data":[]}"#
                }),
            ),
    )
    .await;

    let (app, state) = http_app(&url, 5_000);
    let (status, body) = get_json(app, "/transactions").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch transactions");
    assert_eq!(requests(&state, "502"), 1);

    let slow = url.replace("/bitcoin/transactions", "/slow");
    let (app, state) = http_app(&slow, 100);
    let (status, _) = get_json(app, "/transactions").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(requests(&state, "502"), 1);
}

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use txscope_core::error::{Result, TxScopeError};

use super::client::TransactionSource;
use super::types::{Transaction, TransactionsResponse};
use crate::app_state::AppState;

pub async fn fetch_transactions(State(app): State<AppState>) -> Response {
    match load(app.transactions().as_ref()).await {
        Ok(data) => (StatusCode::OK, Json(TransactionsResponse::ok(data))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, code = e.client_code().as_str(), "transactions request failed");
            error_response(&e)
        }
    }
}

/// Fetch and reject empty pages.
pub async fn load(source: &dyn TransactionSource) -> Result<Vec<Transaction>> {
    let data = source.fetch().await?;
    if data.is_empty() {
        return Err(TxScopeError::NotFound("upstream returned no transactions".into()));
    }
    Ok(data)
}

/// Client-facing envelope for a failed fetch.
pub fn error_response(err: &TxScopeError) -> Response {
    let msg = match err {
        TxScopeError::NotFound(_) => "No transactions found",
        TxScopeError::Upstream(_) | TxScopeError::UpstreamStatus(_) => "Failed to fetch transactions",
        TxScopeError::Decode(_) => "Failed to parse response",
        _ => "Internal server error",
    };
    let status = StatusCode::from_u16(err.client_code().http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(TransactionsResponse::error(msg))).into_response()
}

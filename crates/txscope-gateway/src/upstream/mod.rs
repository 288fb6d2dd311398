//! Upstream transaction feed proxy.
//!
//! `GET /transactions` fetches the provider's latest transactions and
//! re-wraps them as `{"success": true, "data": [...]}`. Failures become
//! `{"success": false, "error": "..."}` with a status that reflects the
//! failure class. Nothing is retried.

pub mod client;
pub mod handler;
pub mod types;

pub use client::{HttpTransactionSource, TransactionSource};
pub use handler::fetch_transactions;
pub use types::{Transaction, TransactionsResponse, UpstreamResponse};

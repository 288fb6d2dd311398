use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provider response: a page of transactions plus request context.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamResponse {
    #[serde(default)]
    pub data: Vec<Transaction>,
    #[serde(default)]
    pub context: Map<String, Value>,
}

/// A Bitcoin transaction as reported by the provider. Missing fields are
/// zero-valued.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub block_id: i64,
    pub id: i64,
    pub hash: String,
    pub date: String,
    pub time: String,
    pub size: i64,
    pub weight: i64,
    pub version: i64,
    pub lock_time: i64,
    pub is_coinbase: bool,
    pub has_witness: bool,
    pub input_count: i64,
    pub output_count: i64,
    pub input_total: i64,
    pub input_total_usd: f64,
    pub output_total: i64,
    pub output_total_usd: f64,
    pub fee: i64,
    pub fee_usd: f64,
    pub fee_per_kb: f64,
    pub fee_per_kb_usd: f64,
    pub fee_per_kwu: f64,
    pub fee_per_kwu_usd: f64,
    pub cdd_total: f64,
}

/// Envelope returned by `GET /transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransactionsResponse {
    pub fn ok(data: Vec<Transaction>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            error: Some(msg.into()),
        }
    }
}

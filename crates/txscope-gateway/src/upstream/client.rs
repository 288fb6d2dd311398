use async_trait::async_trait;
use bytes::Bytes;

use txscope_core::error::{Result, TxScopeError};

use super::types::{Transaction, UpstreamResponse};
use crate::config::UpstreamSection;

/// Source of transactions. The HTTP implementation talks to the provider;
/// tests substitute their own.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Transaction>>;
}

/// Fetches from the configured provider URL with a client-side timeout.
pub struct HttpTransactionSource {
    client: reqwest::Client,
    url: String,
}

impl HttpTransactionSource {
    pub fn new(cfg: &UpstreamSection) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| TxScopeError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            url: cfg.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TransactionSource for HttpTransactionSource {
    async fn fetch(&self) -> Result<Vec<Transaction>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TxScopeError::Upstream(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TxScopeError::UpstreamStatus(status.as_u16()));
        }

        let body: Bytes = resp
            .bytes()
            .await
            .map_err(|e| TxScopeError::Upstream(format!("read body failed: {e}")))?;

        let parsed: UpstreamResponse = serde_json::from_slice(&body)
            .map_err(|e| TxScopeError::Decode(format!("upstream json: {e}")))?;

        tracing::debug!(
            url = %self.url,
            count = parsed.data.len(),
            context_keys = parsed.context.len(),
            "upstream transactions fetched"
        );
        Ok(parsed.data)
    }
}

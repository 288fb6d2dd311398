//! Shared error type across txscope crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed configuration.
    BadRequest,
    /// Metric registration conflict or malformed metric definition.
    InvalidMetric,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Upstream provider unreachable or misbehaving.
    BadGateway,
    /// Upstream returned nothing usable.
    NotFound,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::InvalidMetric => "INVALID_METRIC",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::BadGateway => "BAD_GATEWAY",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status code carried by responses for this error class.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::BadRequest => 400,
            ClientCode::NotFound => 404,
            ClientCode::BadGateway => 502,
            ClientCode::InvalidMetric
            | ClientCode::UnsupportedVersion
            | ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TxScopeError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum TxScopeError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("duplicate metric: {0}")]
    DuplicateMetric(String),
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("upstream: {0}")]
    Upstream(String),
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),
    #[error("decode: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl TxScopeError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TxScopeError::BadRequest(_) => ClientCode::BadRequest,
            TxScopeError::DuplicateMetric(_) | TxScopeError::InvalidMetric(_) => {
                ClientCode::InvalidMetric
            }
            TxScopeError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            TxScopeError::Upstream(_) | TxScopeError::UpstreamStatus(_) => ClientCode::BadGateway,
            TxScopeError::NotFound(_) => ClientCode::NotFound,
            TxScopeError::Decode(_) | TxScopeError::Internal(_) => ClientCode::Internal,
        }
    }
}

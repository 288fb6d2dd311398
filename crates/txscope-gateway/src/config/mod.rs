//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use txscope_core::error::{Result, TxScopeError};

pub use schema::{GatewayConfig, GatewaySection, SamplerSection, UpstreamSection};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TXSCOPE_CONFIG";
/// Config file used when `TXSCOPE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "txscope.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TxScopeError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| TxScopeError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config path from the environment and load it. A missing file
/// yields the built-in defaults; any other failure is returned.
pub fn load_or_default() -> Result<GatewayConfig> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match fs::metadata(&path) {
        Ok(_) => load_from_file(&path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(%path, "config file not found, using defaults");
            let cfg = GatewayConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
        Err(e) => Err(TxScopeError::Internal(format!("stat config failed: {e}"))),
    }
}

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use txscope_core::error::{Result, TxScopeError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub sampler: SamplerSection,

    #[serde(default)]
    pub upstream: UpstreamSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            sampler: SamplerSection::default(),
            upstream: UpstreamSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TxScopeError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.sampler.validate()?;
        self.upstream.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Time in-flight requests get to finish after a shutdown signal.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.shutdown_grace_ms > 120_000 {
            return Err(TxScopeError::BadRequest(
                "gateway.shutdown_grace_ms must be at most 120000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|_| TxScopeError::BadRequest("gateway.listen must be a valid SocketAddr".into()))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerSection {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for SamplerSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl SamplerSection {
    pub fn validate(&self) -> Result<()> {
        if !(1_000..=3_600_000).contains(&self.interval_ms) {
            return Err(TxScopeError::BadRequest(
                "sampler.interval_ms must be between 1000 and 3600000".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    #[serde(default = "default_upstream_url")]
    pub url: String,

    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(TxScopeError::BadRequest(
                "upstream.url must start with http:// or https://".into(),
            ));
        }
        if !(1..=300_000).contains(&self.timeout_ms) {
            return Err(TxScopeError::BadRequest(
                "upstream.timeout_ms must be between 1 and 300000".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_shutdown_grace_ms() -> u64 {
    10_000
}
fn default_interval_ms() -> u64 {
    15_000
}
fn default_upstream_url() -> String {
    "https://api.blockchair.com/bitcoin/transactions".into()
}
fn default_upstream_timeout_ms() -> u64 {
    30_000
}

use std::str::FromStr;

use tokio::time::Duration;

use crate::resolver::{ResolverSettings, DEFAULT_FIRST_INDEX, DEFAULT_MAX_ATTEMPTS, DEFAULT_TOLERANCE_SECS};
use crate::rpc_oracle::RpcOracle;

pub const DEFAULT_RPC_URL: &str = "https://api.securerpc.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub rpc_url: String,
    pub first_index: u64,
    pub tolerance_secs: u64,
    pub max_attempts: u32,
    pub rpc_tries: u32,
    pub rpc_retry_delay: Duration,
    pub resolve_timeout: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            first_index: DEFAULT_FIRST_INDEX,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rpc_tries: 1,
            rpc_retry_delay: Duration::from_millis(500),
            resolve_timeout: None,
        }
    }
}

impl ResolverConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        let rpc_url = std::env::var("RPC_URL")
            .or_else(|_| std::env::var("ETHEREUM_RPC_URL"))
            .unwrap_or(defaults.rpc_url);
        let first_index = parse_var("FIRST_BLOCK")?.unwrap_or(defaults.first_index);
        let tolerance_secs = parse_var("TOLERANCE_SECS")?.unwrap_or(defaults.tolerance_secs);
        let max_attempts = positive(
            "MAX_ATTEMPTS",
            parse_var("MAX_ATTEMPTS")?.unwrap_or(defaults.max_attempts),
        )?;
        let rpc_tries = positive("RPC_RETRIES", parse_var("RPC_RETRIES")?.unwrap_or(defaults.rpc_tries))?;
        let rpc_retry_delay = parse_var("RPC_RETRY_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.rpc_retry_delay);
        let resolve_timeout = parse_var("RESOLVE_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(Self {
            rpc_url,
            first_index,
            tolerance_secs,
            max_attempts,
            rpc_tries,
            rpc_retry_delay,
            resolve_timeout,
        })
    }

    pub fn settings(&self) -> ResolverSettings {
        ResolverSettings {
            first_index: self.first_index,
            tolerance_secs: self.tolerance_secs,
            max_attempts: self.max_attempts,
        }
    }

    pub fn build_oracle(&self) -> Result<RpcOracle, Box<dyn std::error::Error + Send + Sync>> {
        Ok(RpcOracle::connect(&self.rpc_url)?.with_retry(self.rpc_tries, self.rpc_retry_delay))
    }
}

fn parse_var<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(value) => {
            let parsed = value.trim().parse::<T>();
            match parsed {
                Ok(v) => Ok(Some(v)),
                Err(e) => Err(ConfigError::Invalid { var, reason: e.to_string(), value }),
            }
        }
        Err(_) => Ok(None),
    }
}

fn positive(var: &'static str, n: u32) -> Result<u32, ConfigError> {
    if n == 0 {
        return Err(ConfigError::Invalid { var, value: n.to_string(), reason: "must be greater than zero".into() });
    }
    Ok(n)
}

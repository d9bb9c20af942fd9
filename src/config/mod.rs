//! Configuration for the swap agent
//!
//! [`AgentConfig`] describes the network, timing and pair table and can be
//! loaded from JSON. [`RunConfig`] holds the per-run trading parameters and is
//! passed explicitly to every scheduling call.

pub mod rpc;

use crate::tokens::{self, TokenPair};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use rpc::RpcConfig;

/// Fee price per unit of gas, e.g. `0.026uzig`
#[derive(Debug, Clone, PartialEq)]
pub struct GasPrice {
    pub amount: f64,
    pub denom: String,
}

impl GasPrice {
    /// Fee in integer units for `gas_limit`, rounded up
    pub fn fee_for(&self, gas_limit: u64) -> u128 {
        (self.amount * gas_limit as f64).ceil() as u128
    }
}

impl FromStr for GasPrice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| Error::Config(format!("Gas price missing denom: {}", s)))?;
        let (amount, denom) = s.split_at(split);
        let amount: f64 = amount
            .parse()
            .map_err(|_| Error::Config(format!("Invalid gas price amount: {}", s)))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::Config(format!("Invalid gas price amount: {}", s)));
        }
        Ok(Self {
            amount,
            denom: denom.to_string(),
        })
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl Serialize for GasPrice {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GasPrice {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Chain endpoint and transaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Tendermint RPC endpoint
    pub rpc_url: String,
    /// Explorer base URL; transaction hashes are appended to it
    pub explorer_url: String,
    pub gas_price: GasPrice,
    /// Multiplier applied to simulated gas
    pub gas_adjustment: f64,
    /// Bech32 prefix for derived addresses
    pub address_prefix: String,
    pub native_denom: String,
    pub native_symbol: String,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: rpc::DEFAULT_RPC_URL.to_string(),
            explorer_url: rpc::DEFAULT_EXPLORER_URL.to_string(),
            gas_price: GasPrice {
                amount: 0.026,
                denom: tokens::NATIVE_DENOM.to_string(),
            },
            gas_adjustment: 1.4,
            address_prefix: "zig".to_string(),
            native_denom: tokens::NATIVE_DENOM.to_string(),
            native_symbol: tokens::NATIVE_SYMBOL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl NetworkConfig {
    /// Explorer link for a transaction hash
    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}{}", self.explorer_url, hash)
    }
}

/// Run window, pauses and backoff
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wall-clock budget for repeating wallet passes
    pub run_window_secs: u64,
    /// Pause between full passes
    pub pass_pause_secs: u64,
    /// Wait after a rate-limit or timeout before retrying
    pub retry_delay_secs: u64,
    /// Interval between inclusion checks for a broadcast transaction
    pub tx_poll_interval_ms: u64,
    /// Inclusion checks before giving up on a transaction
    pub tx_poll_attempts: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            run_window_secs: 600,
            pass_pause_secs: 10,
            retry_delay_secs: 600,
            tx_poll_interval_ms: 1_000,
            tx_poll_attempts: 30,
        }
    }
}

impl TimingConfig {
    pub fn run_window(&self) -> Duration {
        Duration::from_secs(self.run_window_secs)
    }

    pub fn pass_pause(&self) -> Duration {
        Duration::from_secs(self.pass_pause_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub network: NetworkConfig,
    pub timing: TimingConfig,
    /// Pairs traded against the native unit
    pub pairs: Vec<TokenPair>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            timing: TimingConfig::default(),
            pairs: tokens::default_pairs(),
        }
    }
}

impl AgentConfig {
    /// Load from a JSON file, then apply environment overrides
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let mut config: AgentConfig = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        RpcConfig::from_env().apply(&mut config.network);
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        RpcConfig::from_env().apply(&mut config.network);
        config
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.network.rpc_url)
            .map_err(|e| Error::Config(format!("Invalid rpc_url {}: {}", self.network.rpc_url, e)))?;
        if self.pairs.is_empty() {
            return Err(Error::Config("No token pairs configured".to_string()));
        }
        if !(self.network.gas_adjustment.is_finite() && self.network.gas_adjustment >= 1.0) {
            return Err(Error::Config(format!(
                "gas_adjustment must be >= 1.0, got {}",
                self.network.gas_adjustment
            )));
        }
        Ok(())
    }
}

/// Per-run trading parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Lower bound (inclusive) of a sampled swap amount, in native units
    pub min_swap_amount: f64,
    /// Upper bound (exclusive) of a sampled swap amount, in native units
    pub max_swap_amount: f64,
    /// Swaps per wallet per pass, across all pairs combined
    pub total_swap_count: u32,
    /// Liquidity actions per wallet per pass
    pub liquidity_round_count: u32,
    /// Pause after each swap or liquidity action
    pub action_delay_secs: u64,
    /// Swap half of each token holding back to the native unit after swapping
    pub swap_back: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            min_swap_amount: 0.01,
            max_swap_amount: 0.05,
            total_swap_count: 5,
            liquidity_round_count: 2,
            action_delay_secs: 10,
            swap_back: true,
        }
    }
}

impl RunConfig {
    pub fn action_delay(&self) -> Duration {
        Duration::from_secs(self.action_delay_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_swap_amount.is_finite() || !self.max_swap_amount.is_finite() {
            return Err(Error::Config("Swap amounts must be finite".to_string()));
        }
        if self.min_swap_amount < 0.0 {
            return Err(Error::Config(format!(
                "Min swap must not be negative, got {}",
                self.min_swap_amount
            )));
        }
        if self.min_swap_amount > self.max_swap_amount {
            return Err(Error::Config(format!(
                "Min swap {} exceeds max swap {}",
                self.min_swap_amount, self.max_swap_amount
            )));
        }
        Ok(())
    }
}

/// Parse a yes/no answer as used by the `--swap-back` flag
pub fn parse_yes_no(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        other => Err(format!("expected yes or no, got '{}'", other)),
    }
}

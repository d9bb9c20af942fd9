//! RPC endpoint configuration
//!
//! The agent talks to exactly one Tendermint RPC endpoint. The built-in
//! ZIGChain testnet endpoint can be replaced through the environment:
//!
//! ```bash
//! export ZIG_RPC_URL="https://my-node.example.org"
//! export ZIG_EXPLORER_URL="https://explorer.example.org/tx/"
//! ```

use super::NetworkConfig;

/// Public ZIGChain testnet RPC (rate limited)
pub const DEFAULT_RPC_URL: &str = "https://testnet-rpc.zigchain.com";

/// Explorer transaction page prefix
pub const DEFAULT_EXPLORER_URL: &str = "https://zigscan.org/tx/";

/// Environment variable names
mod env_vars {
    pub const RPC_URL: &str = "ZIG_RPC_URL";
    pub const EXPLORER_URL: &str = "ZIG_EXPLORER_URL";
}

/// Endpoint overrides collected from the environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RpcConfig {
    rpc_url: Option<String>,
    explorer_url: Option<String>,
}

impl RpcConfig {
    pub fn from_env() -> Self {
        let rpc_url = std::env::var(env_vars::RPC_URL)
            .ok()
            .filter(|v| !v.trim().is_empty());
        if rpc_url.is_some() {
            tracing::debug!("Using {} for the chain endpoint", env_vars::RPC_URL);
        }
        let explorer_url = std::env::var(env_vars::EXPLORER_URL)
            .ok()
            .filter(|v| !v.trim().is_empty());

        Self {
            rpc_url,
            explorer_url,
        }
    }

    /// Create with explicit overrides
    pub fn with_urls(rpc_url: Option<String>, explorer_url: Option<String>) -> Self {
        Self {
            rpc_url,
            explorer_url,
        }
    }

    /// Overwrite the network endpoints that have an override
    pub fn apply(&self, network: &mut NetworkConfig) {
        if let Some(url) = &self.rpc_url {
            network.rpc_url = url.trim().to_string();
        }
        if let Some(url) = &self.explorer_url {
            network.explorer_url = url.trim().to_string();
        }
        if network.rpc_url == DEFAULT_RPC_URL {
            tracing::debug!("Using public testnet RPC (rate limited)");
        }
    }
}

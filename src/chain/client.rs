//! Chain client capabilities
//!
//! The orchestration code only sees these traits. `ChainConnector` opens
//! connections; a connection is used for a single operation and dropped.

use crate::wallet::Wallet;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Amount of one denomination attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: &str, amount: u128) -> Self {
        Self {
            denom: denom.to_string(),
            amount,
        }
    }
}

/// Result of a committed transaction; reported, never retained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub hash: String,
    pub height: u64,
    pub gas_used: u64,
}

/// Read-only connection
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Raw integer balance of `denom` held by `address`
    async fn balance(&self, address: &str, denom: &str) -> Result<u128>;

    /// CosmWasm smart query; `query` and the response are JSON
    async fn query_contract_smart(&self, contract: &str, query: &Value) -> Result<Value>;
}

/// Connection bound to one signer
///
/// Submission and confirmation are separate steps so that a retried
/// confirmation never submits the transaction a second time.
#[async_trait]
pub trait SigningClient: QueryClient {
    /// Sign and submit a `MsgExecuteContract` from the bound signer.
    /// Returns the transaction hash once the node accepts it.
    async fn broadcast_execute(&self, contract: &str, msg: &Value, funds: &[Coin]) -> Result<String>;

    /// Wait until the transaction `hash` is committed
    async fn confirm_tx(&self, hash: &str) -> Result<TxReceipt>;
}

#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn QueryClient>>;

    async fn connect_signer(&self, wallet: &Wallet) -> Result<Box<dyn SigningClient>>;
}

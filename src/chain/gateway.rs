//! Chain client gateway
//!
//! Every remote call made by the agent goes through here. Each call opens a
//! fresh connection and both the connect and the call itself run inside the
//! retry executor, labelled with the call site.

use super::client::{ChainConnector, Coin, QueryClient, SigningClient, TxReceipt};
use crate::retry::RetryExecutor;
use crate::wallet::Wallet;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

pub struct Gateway {
    connector: Arc<dyn ChainConnector>,
    executor: RetryExecutor,
}

impl Gateway {
    pub fn new(connector: Arc<dyn ChainConnector>, executor: RetryExecutor) -> Self {
        Self {
            connector,
            executor,
        }
    }

    pub async fn connect_read_only(&self, context: &str) -> Result<Box<dyn QueryClient>> {
        let label = format!("{} connect", context);
        self.executor
            .execute(&label, || self.connector.connect())
            .await
    }

    pub async fn connect_signing(
        &self,
        wallet: &Wallet,
        context: &str,
    ) -> Result<Box<dyn SigningClient>> {
        let label = format!("{} signerConnect", context);
        self.executor
            .execute(&label, || self.connector.connect_signer(wallet))
            .await
    }

    /// Raw integer balance
    pub async fn get_balance(&self, address: &str, denom: &str) -> Result<u128> {
        let client = self.connect_read_only("getBalance").await?;
        let label = format!("getBalance {}", denom);
        self.executor
            .execute(&label, || client.balance(address, denom))
            .await
    }

    /// Typed CosmWasm smart query
    pub async fn query_contract_smart<Q, R>(&self, contract: &str, query: &Q, context: &str) -> Result<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let query = serde_json::to_value(query)?;
        let client = self.connect_read_only(context).await?;
        let label = format!("{} {}", context, contract);
        let value = self
            .executor
            .execute(&label, || client.query_contract_smart(contract, &query))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Sign and submit a contract execution from `wallet`, then wait for it
    /// to be committed.
    ///
    /// Submission and confirmation retry independently: once a transaction
    /// is accepted only the confirmation is repeated.
    pub async fn execute<M>(
        &self,
        wallet: &Wallet,
        contract: &str,
        msg: &M,
        funds: &[Coin],
        context: &str,
    ) -> Result<TxReceipt>
    where
        M: Serialize + ?Sized,
    {
        let msg = serde_json::to_value(msg)?;
        let client = self.connect_signing(wallet, context).await?;
        let hash = self
            .executor
            .execute(context, || client.broadcast_execute(contract, &msg, funds))
            .await?;

        let label = format!("{} confirm", context);
        let receipt = self
            .executor
            .execute(&label, || client.confirm_tx(&hash))
            .await?;
        tracing::debug!(
            tx_hash = %receipt.hash,
            height = receipt.height,
            gas_used = receipt.gas_used,
            "Transaction committed"
        );
        Ok(receipt)
    }
}

//! Tendermint RPC backend
//!
//! Queries go through `abci_query` with protobuf-encoded gRPC request types.
//! Transactions are simulated for gas, signed locally and submitted with
//! `broadcast_tx_sync`; inclusion is confirmed separately by polling `tx`.
//!
//! Transport failures are classified by [`Error::from_rpc`].

use super::client::{ChainConnector, Coin, QueryClient, SigningClient, TxReceipt};
use crate::clock::Clock;
use crate::config::{GasPrice, NetworkConfig, TimingConfig};
use crate::error::mentions_missing;
use crate::wallet::Wallet;
use crate::{Error, Result};
use async_trait::async_trait;
use cosmrs::cosmwasm::MsgExecuteContract;
use cosmrs::proto::cosmos::auth::v1beta1::{
    BaseAccount, QueryAccountInfoRequest, QueryAccountInfoResponse,
};
use cosmrs::proto::cosmos::bank::v1beta1::{QueryBalanceRequest, QueryBalanceResponse};
use cosmrs::proto::cosmos::tx::v1beta1::{SimulateRequest, SimulateResponse};
use cosmrs::proto::cosmwasm::wasm::v1::{
    QuerySmartContractStateRequest, QuerySmartContractStateResponse,
};
use cosmrs::rpc::endpoint::tx::Response as TxResponse;
use cosmrs::rpc::{Client, HttpClient, HttpClientUrl};
use cosmrs::tendermint::Hash;
use cosmrs::tx::{self, Fee, Msg, SignDoc, SignerInfo};
use cosmrs::{AccountId, Any};
use prost::Message;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const BANK_BALANCE_PATH: &str = "/cosmos.bank.v1beta1.Query/Balance";
const ACCOUNT_INFO_PATH: &str = "/cosmos.auth.v1beta1.Query/AccountInfo";
const SMART_QUERY_PATH: &str = "/cosmwasm.wasm.v1.Query/SmartContractState";
const SIMULATE_PATH: &str = "/cosmos.tx.v1beta1.Service/Simulate";

/// Gas assumed when a simulation reports no gas info
const FALLBACK_GAS: u64 = 200_000;

/// Map a failed ABCI query to an error
fn classify_abci_failure(path: &str, codespace: &str, code: u32, log: &str) -> Error {
    let detail = format!(
        "{} failed (codespace {}, code {}): {}",
        path, codespace, code, log
    );
    if mentions_missing(log) {
        Error::NotFound(detail)
    } else {
        Error::Rpc(detail)
    }
}

/// Typed queries and submission against a single Tendermint endpoint
pub struct TendermintRpc {
    url: String,
    client: HttpClient,
}

impl fmt::Debug for TendermintRpc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TendermintRpc")
            .field("url", &self.url)
            .finish()
    }
}

impl TendermintRpc {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let parsed = HttpClientUrl::from_str(url)
            .map_err(|e| Error::Config(format!("Invalid rpc_url {}: {}", url, e)))?;
        let client = HttpClient::builder(parsed)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::from_rpc(url, e))?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run a gRPC query through `abci_query`
    async fn abci_query<Req: Message, Resp: Message + Default>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let response = self
            .client
            .abci_query(Some(path.to_string()), request.encode_to_vec(), None, false)
            .await
            .map_err(|e| Error::from_rpc(&self.url, e))?;

        if response.code.is_err() {
            return Err(classify_abci_failure(
                path,
                &response.codespace,
                response.code.value(),
                &response.log,
            ));
        }
        Ok(Resp::decode(response.value.as_slice())?)
    }

    pub async fn chain_id(&self) -> Result<String> {
        let status = self
            .client
            .status()
            .await
            .map_err(|e| Error::from_rpc(&self.url, e))?;
        Ok(status.node_info.network.to_string())
    }

    pub async fn balance(&self, address: &str, denom: &str) -> Result<u128> {
        let request = QueryBalanceRequest {
            address: address.to_string(),
            denom: denom.to_string(),
        };
        let response: QueryBalanceResponse = self.abci_query(BANK_BALANCE_PATH, &request).await?;

        match response.balance {
            Some(coin) if !coin.amount.is_empty() => coin
                .amount
                .parse::<u128>()
                .map_err(|e| Error::Encoding(format!("balance {}: {}", coin.amount, e))),
            _ => Ok(0),
        }
    }

    pub async fn smart_query(&self, contract: &str, query: &Value) -> Result<Value> {
        let request = QuerySmartContractStateRequest {
            address: contract.to_string(),
            query_data: serde_json::to_vec(query)?,
        };
        let response: QuerySmartContractStateResponse =
            self.abci_query(SMART_QUERY_PATH, &request).await?;

        Ok(serde_json::from_slice(&response.data)?)
    }

    pub async fn account(&self, address: &str) -> Result<BaseAccount> {
        let request = QueryAccountInfoRequest {
            address: address.to_string(),
        };
        let response: QueryAccountInfoResponse =
            self.abci_query(ACCOUNT_INFO_PATH, &request).await?;

        response
            .info
            .ok_or_else(|| Error::NotFound(format!("account {}", address)))
    }

    pub async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<u64> {
        #[allow(deprecated)]
        let request = SimulateRequest { tx: None, tx_bytes };
        let response: SimulateResponse = self.abci_query(SIMULATE_PATH, &request).await?;

        Ok(response
            .gas_info
            .map(|info| info.gas_used)
            .unwrap_or(FALLBACK_GAS))
    }

    /// Submit signed bytes; fails if CheckTx rejects the transaction
    pub async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<Hash> {
        let response = self
            .client
            .broadcast_tx_sync(tx_bytes)
            .await
            .map_err(|e| Error::from_rpc(&self.url, e))?;

        if response.code.is_err() {
            return Err(Error::Broadcast(format!(
                "{} (code {}): {}",
                response.hash,
                response.code.value(),
                response.log
            )));
        }
        Ok(response.hash)
    }

    /// Look up an included transaction by hash
    async fn tx(&self, hash: Hash) -> Result<TxResponse> {
        self.client
            .tx(hash, false)
            .await
            .map_err(|e| Error::from_rpc(&self.url, e))
    }
}

/// Opens connections against one RPC endpoint
pub struct RpcConnector {
    rpc: Arc<TendermintRpc>,
    network: NetworkConfig,
    timing: TimingConfig,
    clock: Arc<dyn Clock>,
}

impl RpcConnector {
    pub fn new(network: &NetworkConfig, timing: &TimingConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let rpc = TendermintRpc::new(
            &network.rpc_url,
            Duration::from_secs(network.request_timeout_secs),
        )?;
        Ok(Self {
            rpc: Arc::new(rpc),
            network: network.clone(),
            timing: timing.clone(),
            clock,
        })
    }
}

#[async_trait]
impl ChainConnector for RpcConnector {
    async fn connect(&self) -> Result<Box<dyn QueryClient>> {
        let chain_id = self.rpc.chain_id().await?;
        tracing::debug!(endpoint = self.rpc.url(), chain_id = %chain_id, "Connected");
        Ok(Box::new(RpcQueryClient {
            rpc: self.rpc.clone(),
        }))
    }

    async fn connect_signer(&self, wallet: &Wallet) -> Result<Box<dyn SigningClient>> {
        let chain_id = self.rpc.chain_id().await?;
        tracing::debug!(
            endpoint = self.rpc.url(),
            chain_id = %chain_id,
            signer = wallet.address(),
            "Connected with signer"
        );
        Ok(Box::new(RpcSigningClient {
            rpc: self.rpc.clone(),
            wallet: wallet.clone(),
            chain_id,
            gas_price: self.network.gas_price.clone(),
            gas_adjustment: self.network.gas_adjustment,
            poll_interval: Duration::from_millis(self.timing.tx_poll_interval_ms),
            poll_attempts: self.timing.tx_poll_attempts,
            clock: self.clock.clone(),
        }))
    }
}

pub struct RpcQueryClient {
    rpc: Arc<TendermintRpc>,
}

#[async_trait]
impl QueryClient for RpcQueryClient {
    async fn balance(&self, address: &str, denom: &str) -> Result<u128> {
        self.rpc.balance(address, denom).await
    }

    async fn query_contract_smart(&self, contract: &str, query: &Value) -> Result<Value> {
        self.rpc.smart_query(contract, query).await
    }
}

pub struct RpcSigningClient {
    rpc: Arc<TendermintRpc>,
    wallet: Wallet,
    chain_id: String,
    gas_price: GasPrice,
    gas_adjustment: f64,
    poll_interval: Duration,
    poll_attempts: u32,
    clock: Arc<dyn Clock>,
}

impl RpcSigningClient {
    fn fee(&self, denom: &str, amount: u128, gas_limit: u64) -> Result<Fee> {
        Ok(Fee::from_amount_and_gas(
            cosmrs::Coin {
                denom: denom.parse()?,
                amount,
            },
            gas_limit,
        ))
    }

    /// Build and sign a single-message transaction
    fn sign_tx(&self, msg: Any, fee: Fee, account: &BaseAccount) -> Result<Vec<u8>> {
        let body = tx::BodyBuilder::new().msg(msg).finish();
        let auth_info =
            SignerInfo::single_direct(Some(self.wallet.public_key()), account.sequence)
                .auth_info(fee);
        let chain_id = cosmrs::tendermint::chain::Id::from_str(&self.chain_id)
            .map_err(|e| Error::Config(format!("Invalid chain id {}: {}", self.chain_id, e)))?;
        let sign_doc = SignDoc::new(&body, &auth_info, &chain_id, account.account_number)?;

        let raw = self.wallet.sign(sign_doc)?;
        Ok(raw.to_bytes()?)
    }
}

#[async_trait]
impl QueryClient for RpcSigningClient {
    async fn balance(&self, address: &str, denom: &str) -> Result<u128> {
        self.rpc.balance(address, denom).await
    }

    async fn query_contract_smart(&self, contract: &str, query: &Value) -> Result<Value> {
        self.rpc.smart_query(contract, query).await
    }
}

#[async_trait]
impl SigningClient for RpcSigningClient {
    async fn broadcast_execute(&self, contract: &str, msg: &Value, funds: &[Coin]) -> Result<String> {
        let mut funds = funds.to_vec();
        // the bank module requires coins sorted by denom
        funds.sort_by(|a, b| a.denom.cmp(&b.denom));
        let funds = funds
            .into_iter()
            .map(|coin| -> Result<cosmrs::Coin> {
                Ok(cosmrs::Coin {
                    denom: coin.denom.parse()?,
                    amount: coin.amount,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let execute_msg = MsgExecuteContract {
            sender: self.wallet.account_id().clone(),
            contract: AccountId::from_str(contract)?,
            msg: serde_json::to_vec(msg)?,
            funds,
        }
        .to_any()?;

        let account = self.rpc.account(self.wallet.address()).await?;

        let simulation_fee = self.fee(&self.gas_price.denom, 0, 0)?;
        let simulation_tx = self.sign_tx(execute_msg.clone(), simulation_fee, &account)?;
        let gas_used = self.rpc.simulate(simulation_tx).await?;

        let gas_limit = (gas_used as f64 * self.gas_adjustment).ceil() as u64;
        let fee = self.fee(
            &self.gas_price.denom,
            self.gas_price.fee_for(gas_limit),
            gas_limit,
        )?;
        let tx_bytes = self.sign_tx(execute_msg, fee, &account)?;

        let hash = self.rpc.broadcast(tx_bytes).await?;
        tracing::debug!(tx_hash = %hash, gas_limit = gas_limit, "Broadcast accepted");
        Ok(hash.to_string())
    }

    async fn confirm_tx(&self, hash: &str) -> Result<TxReceipt> {
        let parsed = Hash::from_str(hash)?;
        for _ in 0..self.poll_attempts {
            self.clock.sleep(self.poll_interval).await;
            match self.rpc.tx(parsed).await {
                Ok(found) => {
                    let result = found.tx_result;
                    if result.code.is_err() {
                        return Err(Error::TransactionFailed {
                            hash: hash.to_string(),
                            code: result.code.value(),
                            log: result.log,
                        });
                    }
                    return Ok(TxReceipt {
                        hash: hash.to_string(),
                        height: found.height.value(),
                        gas_used: u64::try_from(result.gas_used).unwrap_or_default(),
                    });
                }
                // not indexed yet
                Err(Error::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(Error::Rpc(format!(
            "transaction {} was not included after {} checks",
            hash, self.poll_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response per connection on a local port
    async fn serve(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let response = response.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let _ = stream.read(&mut buf).await;
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    #[test]
    fn test_abci_not_found_classification() {
        let err = classify_abci_failure(
            SMART_QUERY_PATH,
            "wasm",
            22,
            "address zig1xyz: no such contract",
        );
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_abci_other_failure_is_rpc_error() {
        let err = classify_abci_failure(
            SMART_QUERY_PATH,
            "wasm",
            5,
            "Error parsing into type pair::QueryMsg",
        );
        assert!(matches!(err, Error::Rpc(_)));
        assert_eq!(err.kind(), crate::ErrorKind::Permanent);
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let err = TendermintRpc::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_http_429_is_rate_limited() {
        let url = serve(http_response("429 Too Many Requests", "")).await;
        let rpc = TendermintRpc::new(&url, Duration::from_secs(5)).unwrap();

        let err = rpc.chain_id().await.unwrap_err();

        assert!(matches!(err, Error::RateLimited { ref endpoint } if *endpoint == url));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_slow_endpoint_is_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                // never answer
                held.push(stream);
            }
        });
        let rpc = TendermintRpc::new(&url, Duration::from_millis(200)).unwrap();

        let err = rpc.chain_id().await.unwrap_err();

        assert!(matches!(err, Error::Timeout(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_unknown_tx_is_not_found() {
        let body = r#"{"jsonrpc":"2.0","id":"1","error":{"code":-32603,"message":"Internal error","data":"tx (0A1B) not found"}}"#;
        let url = serve(http_response("200 OK", body)).await;
        let rpc = TendermintRpc::new(&url, Duration::from_secs(5)).unwrap();

        let err = rpc.tx(Hash::Sha256([0xAB; 32])).await.unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_permanent() {
        let url = serve(http_response("500 Internal Server Error", "")).await;
        let rpc = TendermintRpc::new(&url, Duration::from_secs(5)).unwrap();

        let err = rpc.chain_id().await.unwrap_err();

        assert!(!err.is_transient());
        assert_eq!(err.kind(), crate::ErrorKind::Permanent);
    }
}

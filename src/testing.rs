//! In-memory chain and virtual clock for unit tests

use crate::chain::{ChainConnector, Coin, QueryClient, SigningClient, TxReceipt};
use crate::clock::Clock;
use crate::wallet::Wallet;
use crate::{Error, Result};
use async_trait::async_trait;
use cosmrs::crypto::secp256k1::SigningKey;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Deterministic wallet; `seed` must be non-zero
pub fn test_wallet(seed: u8) -> Wallet {
    let key = SigningKey::from_slice(&[seed; 32]).expect("valid test key");
    Wallet::from_signing_key(key, "zig").expect("valid test wallet")
}

/// Clock whose sleeps advance virtual time instantly
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

/// A transaction accepted by [`MockChain`]
#[derive(Debug, Clone)]
pub struct ExecutedTx {
    pub hash: String,
    pub sender: String,
    pub contract: String,
    pub msg: Value,
    pub funds: Vec<Coin>,
}

#[derive(Default)]
struct ChainState {
    balances: HashMap<(String, String), u128>,
    pools: HashMap<String, Value>,
    executions: Vec<ExecutedTx>,
    balance_failures: VecDeque<Error>,
    query_failures: VecDeque<Error>,
    confirm_failures: VecDeque<Error>,
    connect_failures: u32,
    connects: u32,
}

/// Shared in-memory chain; clones observe the same state.
///
/// Broadcasts debit the attached funds from the sender; confirmations look
/// the hash up among accepted transactions.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, address: &str, denom: &str, amount: u128) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert((address.to_string(), denom.to_string()), amount);
    }

    pub fn balance_of(&self, address: &str, denom: &str) -> u128 {
        lookup_balance(&self.state.lock().unwrap(), address, denom)
    }

    /// Pool response returned for `{"pool":{}}` on `contract`
    pub fn set_pool(&self, contract: &str, response: Value) {
        self.state
            .lock()
            .unwrap()
            .pools
            .insert(contract.to_string(), response);
    }

    /// Queue an error for the next balance query
    pub fn fail_next_balance(&self, error: Error) {
        self.state.lock().unwrap().balance_failures.push_back(error);
    }

    /// Queue an error for the next smart query
    pub fn fail_next_query(&self, error: Error) {
        self.state.lock().unwrap().query_failures.push_back(error);
    }

    /// Queue an error for the next inclusion check
    pub fn fail_next_confirm(&self, error: Error) {
        self.state.lock().unwrap().confirm_failures.push_back(error);
    }

    /// Fail the next `count` connects with a header timeout
    pub fn fail_next_connects(&self, count: u32) {
        self.state.lock().unwrap().connect_failures = count;
    }

    pub fn connect_count(&self) -> u32 {
        self.state.lock().unwrap().connects
    }

    pub fn executions(&self) -> Vec<ExecutedTx> {
        self.state.lock().unwrap().executions.clone()
    }

    fn try_connect(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        if state.connect_failures > 0 {
            state.connect_failures -= 1;
            return Err(Error::Timeout("UND_ERR_HEADERS_TIMEOUT".to_string()));
        }
        Ok(())
    }
}

fn lookup_balance(state: &ChainState, address: &str, denom: &str) -> u128 {
    state
        .balances
        .get(&(address.to_string(), denom.to_string()))
        .copied()
        .unwrap_or(0)
}

struct MockClient {
    chain: MockChain,
    sender: String,
}

#[async_trait]
impl QueryClient for MockClient {
    async fn balance(&self, address: &str, denom: &str) -> Result<u128> {
        let mut state = self.chain.state.lock().unwrap();
        if let Some(error) = state.balance_failures.pop_front() {
            return Err(error);
        }
        Ok(lookup_balance(&state, address, denom))
    }

    async fn query_contract_smart(&self, contract: &str, _query: &Value) -> Result<Value> {
        let mut state = self.chain.state.lock().unwrap();
        if let Some(error) = state.query_failures.pop_front() {
            return Err(error);
        }
        state
            .pools
            .get(contract)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no such contract: {}", contract)))
    }
}

#[async_trait]
impl SigningClient for MockClient {
    async fn broadcast_execute(&self, contract: &str, msg: &Value, funds: &[Coin]) -> Result<String> {
        let mut state = self.chain.state.lock().unwrap();
        for coin in funds {
            let key = (self.sender.clone(), coin.denom.clone());
            let held = state.balances.get(&key).copied().unwrap_or(0);
            if held < coin.amount {
                return Err(Error::TransactionFailed {
                    hash: String::new(),
                    code: 5,
                    log: format!("insufficient funds: {} < {}{}", held, coin.amount, coin.denom),
                });
            }
            state.balances.insert(key, held - coin.amount);
        }

        let hash = format!("{:064X}", state.executions.len() + 1);
        state.executions.push(ExecutedTx {
            hash: hash.clone(),
            sender: self.sender.clone(),
            contract: contract.to_string(),
            msg: msg.clone(),
            funds: funds.to_vec(),
        });

        Ok(hash)
    }

    async fn confirm_tx(&self, hash: &str) -> Result<TxReceipt> {
        let mut state = self.chain.state.lock().unwrap();
        if let Some(error) = state.confirm_failures.pop_front() {
            return Err(error);
        }
        let index = state
            .executions
            .iter()
            .position(|tx| tx.hash == hash)
            .ok_or_else(|| Error::NotFound(format!("tx ({}) not found", hash)))?;

        Ok(TxReceipt {
            hash: hash.to_string(),
            height: index as u64 + 1,
            gas_used: 150_000,
        })
    }
}

#[async_trait]
impl ChainConnector for MockChain {
    async fn connect(&self) -> Result<Box<dyn QueryClient>> {
        self.try_connect()?;
        Ok(Box::new(MockClient {
            chain: self.clone(),
            sender: String::new(),
        }))
    }

    async fn connect_signer(&self, wallet: &Wallet) -> Result<Box<dyn SigningClient>> {
        self.try_connect()?;
        Ok(Box::new(MockClient {
            chain: self.clone(),
            sender: wallet.address().to_string(),
        }))
    }
}

//! Chain access
//!
//! `client` defines the capabilities the agent needs from a chain, `rpc`
//! implements them over the Tendermint RPC client and `gateway` wraps every call
//! in the retry executor.

pub mod client;
pub mod gateway;
pub mod rpc;

pub use client::{ChainConnector, Coin, QueryClient, SigningClient, TxReceipt};
pub use gateway::Gateway;
pub use rpc::{RpcConnector, TendermintRpc};

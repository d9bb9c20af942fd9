//! Oroswap Agent
//!
//! An unattended agent that drives a set of ZIGChain wallets through
//! repeated swaps and liquidity provision on Oroswap pairs:
//! - Swaps random amounts of the native unit into each configured pair
//! - Optionally swaps half of each token holding back
//! - Provides liquidity matched to the live pool ratio
//!
//! # Failure Model
//!
//! - Every remote call runs inside the retry executor
//! - Rate limits and timeouts are retried after a fixed backoff, forever
//! - Missing pool state skips the liquidity action
//! - Anything else ends the run

pub mod balance;
pub mod chain;
pub mod clock;
pub mod config;
pub mod dex;
pub mod liquidity;
pub mod retry;
pub mod runner;
pub mod scheduler;
pub mod swap;
pub mod tokens;
pub mod wallet;

mod error;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{AgentConfig, NetworkConfig, RpcConfig, RunConfig, TimingConfig};
pub use error::{Error, ErrorKind, Result};
pub use runner::{AgentRunner, RunReport};
pub use scheduler::RunStats;

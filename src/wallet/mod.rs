//! Secure wallet management
//!
//! This module handles mnemonic loading, key derivation and transaction
//! signing. The private key NEVER leaves this module.

mod loader;
mod signer;

pub use loader::{load_mnemonics, parse_mnemonics};
pub use signer::Wallet;

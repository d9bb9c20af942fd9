//! Secure wallet implementation
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are derived from the mnemonic once and held in cosmrs' `SigningKey`
//! - Keys are never serialized
//! - Keys are never logged
//! - Signing is the only operation that touches the key

use crate::{Error, Result};
use bip39::{Language, Mnemonic};
use cosmrs::crypto::secp256k1::SigningKey;
use cosmrs::crypto::PublicKey;
use cosmrs::tx::{Raw, SignDoc};
use cosmrs::AccountId;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// Cosmos coin type 118, first account
const DERIVATION_PATH: &str = "m/44'/118'/0'/0/0";

/// Signer and its derived bech32 address
///
/// Cheap to clone; clones share the same key.
#[derive(Clone)]
pub struct Wallet {
    signing_key: Arc<SigningKey>,
    public_key: PublicKey,
    address: AccountId,
}

impl Wallet {
    /// Derive a wallet from a 12 to 24 word BIP-39 mnemonic
    pub fn from_mnemonic(mnemonic: &SecretString, prefix: &str) -> Result<Self> {
        let mnemonic =
            Mnemonic::parse_in_normalized(Language::English, mnemonic.expose_secret().trim())
                .map_err(|e| Error::Wallet(format!("Invalid mnemonic: {}", e)))?;
        let seed = mnemonic.to_seed("");

        let signing_key = SigningKey::derive_from_path(seed, &DERIVATION_PATH.parse()?)
            .map_err(|e| Error::Wallet(format!("Key derivation failed: {}", e)))?;

        Self::from_signing_key(signing_key, prefix)
    }

    pub fn from_signing_key(signing_key: SigningKey, prefix: &str) -> Result<Self> {
        let public_key = signing_key.public_key();
        let address = public_key
            .account_id(prefix)
            .map_err(|e| Error::Wallet(format!("Invalid address prefix {}: {}", prefix, e)))?;

        Ok(Self {
            signing_key: Arc::new(signing_key),
            public_key,
            address,
        })
    }

    /// Bech32 address (safe to share)
    pub fn address(&self) -> &str {
        self.address.as_ref()
    }

    pub fn account_id(&self) -> &AccountId {
        &self.address
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Sign a transaction in SIGN_MODE_DIRECT
    pub fn sign(&self, sign_doc: SignDoc) -> Result<Raw> {
        sign_doc
            .sign(&self.signing_key)
            .map_err(|e| Error::Wallet(format!("Signing failed: {}", e)))
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

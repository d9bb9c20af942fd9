//! Pair contract wire messages
//!
//! Oroswap pairs speak the Astroport pair interface. Only the messages the
//! agent sends are defined here.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Native or CW20 asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetInfo {
    /// Non-native Token
    Token { contract_addr: String },
    /// Native token
    NativeToken { denom: String },
}

impl AssetInfo {
    pub fn native(denom: &str) -> Self {
        AssetInfo::NativeToken {
            denom: denom.to_string(),
        }
    }

    pub fn denom(&self) -> Option<&str> {
        match self {
            AssetInfo::NativeToken { denom } => Some(denom),
            AssetInfo::Token { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub info: AssetInfo,
    /// Amount in micro-units
    #[serde(with = "uint128")]
    pub amount: u128,
}

impl Asset {
    pub fn native(denom: &str, amount: u128) -> Self {
        Self {
            info: AssetInfo::native(denom),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    Swap {
        offer_asset: Asset,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_spread: Option<String>,
    },
    ProvideLiquidity {
        assets: Vec<Asset>,
        #[serde(skip_serializing_if = "Option::is_none")]
        slippage_tolerance: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    Pool {},
}

/// Pool assets and the total amount of LP shares issued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolResponse {
    pub assets: Vec<Asset>,
    #[serde(default, with = "uint128")]
    pub total_share: u128,
}

/// CosmWasm `Uint128` travels as a decimal string
mod uint128 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

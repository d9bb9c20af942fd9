//! Pool reserve snapshot
//!
//! Fetched right before each liquidity action and never cached.

use super::msg::PoolResponse;
use crate::tokens::from_micro;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolState {
    /// Token-side reserve, decimal units
    pub reserve_token: f64,
    /// Native-side reserve, decimal units
    pub reserve_native: f64,
}

impl PoolState {
    /// Extract the token and native reserves from a pool response.
    ///
    /// Assets are matched by denom; when the denoms are not both present the
    /// first asset is taken as the token side and the second as the native
    /// side. Returns `None` when fewer than two assets are reported.
    pub fn from_response(
        response: &PoolResponse,
        token_denom: &str,
        native_denom: &str,
    ) -> Option<Self> {
        if response.assets.len() < 2 {
            return None;
        }

        let find = |denom: &str| {
            response
                .assets
                .iter()
                .find(|asset| asset.info.denom() == Some(denom))
        };

        let (token, native) = match (find(token_denom), find(native_denom)) {
            (Some(token), Some(native)) => (token, native),
            _ => (&response.assets[0], &response.assets[1]),
        };

        Some(Self {
            reserve_token: from_micro(token.amount),
            reserve_native: from_micro(native.amount),
        })
    }

    /// Token reserve per unit of native reserve; `None` for an empty side
    pub fn ratio(&self) -> Option<f64> {
        if self.reserve_token <= 0.0 || self.reserve_native <= 0.0 {
            return None;
        }
        let ratio = self.reserve_token / self.reserve_native;
        ratio.is_finite().then_some(ratio)
    }
}

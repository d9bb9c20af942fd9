//! Swap invoker
//!
//! Builds a single `swap` execution against a pair contract and submits it
//! through the gateway. There is no simulation step; the pair enforces the
//! spread limit.

use crate::chain::{Coin, Gateway, TxReceipt};
use crate::config::NetworkConfig;
use crate::dex::{Asset, ExecuteMsg};
use crate::tokens::{find_pair, to_micro, TokenPair};
use crate::wallet::Wallet;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum spread accepted on every swap (1%)
pub const MAX_SPREAD: &str = "0.01";

pub struct SwapInvoker {
    gateway: Arc<Gateway>,
    pairs: Vec<TokenPair>,
    network: NetworkConfig,
}

impl SwapInvoker {
    pub fn new(gateway: Arc<Gateway>, pairs: Vec<TokenPair>, network: &NetworkConfig) -> Self {
        Self {
            gateway,
            pairs,
            network: network.clone(),
        }
    }

    /// Offer `amount` (decimal units) of `offer_denom` to the pair named
    /// `pair_symbol`, asking for `ask_denom`.
    ///
    /// Returns `Ok(None)` without touching the chain when the pair is unknown
    /// or the amount rounds to zero micro-units.
    #[allow(clippy::too_many_arguments)]
    pub async fn perform_swap(
        &self,
        wallet: &Wallet,
        offer_denom: &str,
        ask_denom: &str,
        amount: f64,
        pair_symbol: &str,
        index: u32,
        total: u32,
    ) -> Result<Option<TxReceipt>> {
        let Some(pair) = find_pair(&self.pairs, pair_symbol) else {
            debug!(pair = pair_symbol, "Unknown pair, swap skipped");
            return Ok(None);
        };

        let micro = to_micro(amount);
        if micro == 0 {
            debug!(pair = pair_symbol, amount, "Swap amount below one micro-unit");
            return Ok(None);
        }

        let msg = ExecuteMsg::Swap {
            offer_asset: Asset::native(offer_denom, micro),
            max_spread: Some(MAX_SPREAD.to_string()),
        };
        let funds = [Coin::new(offer_denom, micro)];
        let context = format!("swap {}", pair.symbol);

        let receipt = self
            .gateway
            .execute(wallet, &pair.contract, &msg, &funds, &context)
            .await?;

        info!(
            wallet = wallet.address(),
            pair = %pair.symbol,
            tx_hash = %receipt.hash,
            "[{}/{}] Swapped {} → {} ({:.6}) | {}",
            index,
            total,
            display_denom(offer_denom),
            display_denom(ask_denom),
            amount,
            self.network.tx_url(&receipt.hash)
        );

        Ok(Some(receipt))
    }
}

/// Last path segment of a denom, e.g. `coin.zig1...uoro` → `uoro`
fn display_denom(denom: &str) -> &str {
    denom.rsplit('.').next().unwrap_or(denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{RetryExecutor, DEFAULT_RETRY_DELAY};
    use crate::testing::{test_wallet, ManualClock, MockChain};
    use crate::tokens::{default_pairs, NATIVE_DENOM};

    fn invoker(chain: &MockChain) -> SwapInvoker {
        let gateway = Gateway::new(
            Arc::new(chain.clone()),
            RetryExecutor::new(Arc::new(ManualClock::new()), DEFAULT_RETRY_DELAY),
        );
        SwapInvoker::new(Arc::new(gateway), default_pairs(), &NetworkConfig::default())
    }

    #[tokio::test]
    async fn test_swap_submits_offer_asset() {
        let chain = MockChain::new();
        let wallet = test_wallet(3);
        chain.set_balance(wallet.address(), NATIVE_DENOM, 10_000_000);
        let oro = default_pairs().remove(0);

        let receipt = invoker(&chain)
            .perform_swap(&wallet, NATIVE_DENOM, &oro.denom, 1.25, "ORO", 1, 4)
            .await
            .unwrap()
            .expect("swap submitted");

        let executed = chain.executions();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].hash, receipt.hash);
        assert_eq!(executed[0].contract, oro.contract);
        assert_eq!(executed[0].funds, vec![Coin::new(NATIVE_DENOM, 1_250_000)]);
        assert_eq!(
            executed[0].msg["swap"]["offer_asset"]["amount"],
            serde_json::json!("1250000")
        );
        assert_eq!(executed[0].msg["swap"]["max_spread"], "0.01");
        assert_eq!(chain.balance_of(wallet.address(), NATIVE_DENOM), 8_750_000);
    }

    #[tokio::test]
    async fn test_unknown_pair_is_noop() {
        let chain = MockChain::new();
        let wallet = test_wallet(3);

        let result = invoker(&chain)
            .perform_swap(&wallet, NATIVE_DENOM, "uatom", 1.0, "ATOM", 1, 1)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(chain.executions().is_empty());
    }

    #[tokio::test]
    async fn test_dust_amount_is_noop() {
        let chain = MockChain::new();
        let wallet = test_wallet(3);

        let result = invoker(&chain)
            .perform_swap(&wallet, NATIVE_DENOM, "x", 0.0000004, "ORO", 1, 1)
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(chain.connect_count(), 0);
    }

    #[test]
    fn test_display_denom() {
        assert_eq!(display_denom("coin.zig1abc.uoro"), "uoro");
        assert_eq!(display_denom("uzig"), "uzig");
    }
}

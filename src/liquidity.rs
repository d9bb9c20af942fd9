//! Liquidity balancer
//!
//! Provides liquidity from a fixed share of the wallet's holdings, scaled so
//! the contribution matches the live pool ratio.

use crate::balance::decimal_balance;
use crate::chain::{Coin, Gateway, TxReceipt};
use crate::config::NetworkConfig;
use crate::dex::{Asset, ExecuteMsg, PoolResponse, PoolState, QueryMsg};
use crate::scheduler::RunStats;
use crate::tokens::{to_micro, TokenPair};
use crate::wallet::Wallet;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Share of each balance offered per liquidity action
pub const BUDGET_FRACTION: f64 = 0.2;

/// Slippage tolerance sent with every provide-liquidity (50%)
pub const SLIPPAGE_TOLERANCE: &str = "0.5";

/// Amounts contributed to a pool, decimal units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub token: f64,
    pub native: f64,
}

/// Scale one side of the budget so that `token / native == ratio`.
///
/// `ratio` is token reserve per native reserve. When the token budget is
/// proportionally larger than the pool, the token side is reduced; otherwise
/// the native side is. The other side is always used in full.
pub fn match_pool_ratio(token_budget: f64, native_budget: f64, ratio: f64) -> Contribution {
    if token_budget / native_budget > ratio {
        Contribution {
            token: native_budget * ratio,
            native: native_budget,
        }
    } else {
        Contribution {
            token: token_budget,
            native: token_budget / ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Wallet holds none of one side
    EmptyBalance,
    /// Pool query failed or reported an unusable reserve set
    PoolUnavailable,
    /// Contribution rounds to zero micro-units on one side
    DustContribution,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiquidityOutcome {
    Provided {
        contribution: Contribution,
        receipt: TxReceipt,
    },
    Skipped(SkipReason),
}

pub struct LiquidityBalancer {
    gateway: Arc<Gateway>,
    network: NetworkConfig,
}

impl LiquidityBalancer {
    pub fn new(gateway: Arc<Gateway>, network: &NetworkConfig) -> Self {
        Self {
            gateway,
            network: network.clone(),
        }
    }

    /// Provide liquidity to `pair` from `wallet`.
    ///
    /// Successful submissions are counted in `stats.liquidity_txs`. An
    /// unreadable pool is logged and skipped; balance and submission failures
    /// propagate.
    pub async fn add_liquidity(
        &self,
        wallet: &Wallet,
        pair: &TokenPair,
        stats: &mut RunStats,
    ) -> Result<LiquidityOutcome> {
        let address = wallet.address();
        let token_balance = decimal_balance(&self.gateway, address, &pair.denom).await?;
        let native_denom = &self.network.native_denom;
        let native_symbol = &self.network.native_symbol;
        let native_balance = decimal_balance(&self.gateway, address, native_denom).await?;

        if token_balance <= 0.0 || native_balance <= 0.0 {
            debug!(
                wallet = address,
                pair = %pair.symbol,
                token_balance,
                native_balance,
                "Nothing to provide"
            );
            return Ok(LiquidityOutcome::Skipped(SkipReason::EmptyBalance));
        }

        let token_budget = token_balance * BUDGET_FRACTION;
        let native_budget = native_balance * BUDGET_FRACTION;

        let Some(pool) = self.pool_state(pair).await? else {
            return Ok(LiquidityOutcome::Skipped(SkipReason::PoolUnavailable));
        };
        let Some(ratio) = pool.ratio() else {
            warn!(pair = %pair.symbol, ?pool, "Pool has an empty reserve, skipping");
            return Ok(LiquidityOutcome::Skipped(SkipReason::PoolUnavailable));
        };

        let contribution = match_pool_ratio(token_budget, native_budget, ratio);
        let token_micro = to_micro(contribution.token);
        let native_micro = to_micro(contribution.native);
        if token_micro == 0 || native_micro == 0 {
            debug!(pair = %pair.symbol, ?contribution, "Contribution rounds to zero");
            return Ok(LiquidityOutcome::Skipped(SkipReason::DustContribution));
        }

        let msg = ExecuteMsg::ProvideLiquidity {
            assets: vec![
                Asset::native(&pair.denom, token_micro),
                Asset::native(native_denom, native_micro),
            ],
            slippage_tolerance: Some(SLIPPAGE_TOLERANCE.to_string()),
        };
        let funds = [
            Coin::new(&pair.denom, token_micro),
            Coin::new(native_denom, native_micro),
        ];
        let context = format!("addLiquidity {}", pair.symbol);

        let receipt = self
            .gateway
            .execute(wallet, &pair.contract, &msg, &funds, &context)
            .await?;

        stats.liquidity_txs += 1;
        info!(
            wallet = address,
            pair = %pair.symbol,
            tx_hash = %receipt.hash,
            "[LP {}] Added liquidity {}/{}: {:.6} {} + {:.6} {} | {}",
            stats.liquidity_txs,
            pair.symbol,
            native_symbol,
            contribution.token,
            pair.symbol,
            contribution.native,
            native_symbol,
            self.network.tx_url(&receipt.hash)
        );

        Ok(LiquidityOutcome::Provided {
            contribution,
            receipt,
        })
    }

    /// Fetch reserves; `None` (with a warning) when the pool cannot be read.
    ///
    /// Transient failures are retried inside the gateway, so any error that
    /// reaches this point skips the pool.
    pub async fn pool_state(&self, pair: &TokenPair) -> Result<Option<PoolState>> {
        let response: PoolResponse = match self
            .gateway
            .query_contract_smart(&pair.contract, &QueryMsg::Pool {}, "pool")
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    pair = %pair.symbol,
                    error = %e,
                    kind = ?e.kind(),
                    "Pool info unavailable, skipping"
                );
                return Ok(None);
            }
        };

        let state = PoolState::from_response(&response, &pair.denom, &self.network.native_denom);
        if state.is_none() {
            warn!(
                pair = %pair.symbol,
                assets = response.assets.len(),
                "Invalid pool info, skipping"
            );
        }
        Ok(state)
    }
}

//! Per-wallet orchestration
//!
//! One wallet pass is: balance snapshot, bounded swap rounds, optional
//! swap-back, then bounded liquidity rounds. Everything inside a pass is
//! sequential because a signing account's sequence numbers must be used in
//! order.

use crate::balance::decimal_balance;
use crate::chain::Gateway;
use crate::clock::Clock;
use crate::config::{NetworkConfig, RunConfig};
use crate::liquidity::{LiquidityBalancer, LiquidityOutcome};
use crate::swap::SwapInvoker;
use crate::tokens::TokenPair;
use crate::wallet::Wallet;
use crate::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Token holdings at or below this are left alone by swap-back
pub const SWAP_BACK_DUST: f64 = 0.0001;

/// Share of each token holding swapped back to the native unit
pub const SWAP_BACK_FRACTION: f64 = 0.5;

/// Counters accumulated over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub swaps_submitted: u64,
    /// Attempts dropped by the amount or balance guard
    pub swaps_skipped: u64,
    pub swap_backs: u64,
    pub liquidity_txs: u64,
    pub liquidity_skipped: u64,
    pub wallets_processed: u64,
}

impl RunStats {
    pub fn merge(mut self, other: RunStats) -> RunStats {
        self.swaps_submitted += other.swaps_submitted;
        self.swaps_skipped += other.swaps_skipped;
        self.swap_backs += other.swap_backs;
        self.liquidity_txs += other.liquidity_txs;
        self.liquidity_skipped += other.liquidity_skipped;
        self.wallets_processed += other.wallets_processed;
        self
    }
}

pub struct WalletScheduler {
    gateway: Arc<Gateway>,
    swaps: SwapInvoker,
    liquidity: LiquidityBalancer,
    pairs: Vec<TokenPair>,
    native_denom: String,
    native_symbol: String,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl WalletScheduler {
    pub fn new(
        gateway: Arc<Gateway>,
        pairs: Vec<TokenPair>,
        network: &NetworkConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            swaps: SwapInvoker::new(gateway.clone(), pairs.clone(), network),
            liquidity: LiquidityBalancer::new(gateway.clone(), network),
            gateway,
            pairs,
            native_denom: network.native_denom.clone(),
            native_symbol: network.native_symbol.clone(),
            clock,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Use a fixed seed for swap amount sampling
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Run one full pass for `wallet` (1-based `index` of `total`)
    pub async fn process_wallet(
        &self,
        wallet: &Wallet,
        config: &RunConfig,
        index: usize,
        total: usize,
        stats: &mut RunStats,
    ) -> Result<()> {
        info!(wallet = wallet.address(), "Wallet [{}/{}]: {}", index, total, wallet.address());

        self.report_balances(wallet).await?;
        self.swap_phase(wallet, config, stats).await?;
        if config.swap_back {
            self.swap_back_phase(wallet, config, stats).await?;
        }
        self.liquidity_phase(wallet, config, stats).await?;

        stats.wallets_processed += 1;
        Ok(())
    }

    /// Log every pair's token balance, then the native balance
    pub async fn report_balances(&self, wallet: &Wallet) -> Result<()> {
        let address = wallet.address();
        for pair in &self.pairs {
            let balance = decimal_balance(&self.gateway, address, &pair.denom).await?;
            info!(wallet = address, pair = %pair.symbol, "{}: {:.6}", pair.symbol, balance);
        }
        let native = decimal_balance(&self.gateway, address, &self.native_denom).await?;
        info!(wallet = address, "{}: {:.6}", self.native_symbol, native);
        Ok(())
    }

    /// Round-robin over the pairs until `total_swap_count` swaps are submitted.
    ///
    /// Each pair gets at most `total_swap_count` attempts, so a wallet that
    /// keeps failing the guards still terminates.
    async fn swap_phase(
        &self,
        wallet: &Wallet,
        config: &RunConfig,
        stats: &mut RunStats,
    ) -> Result<()> {
        let cap = config.total_swap_count;
        let attempts = cap as usize * self.pairs.len();
        let mut submitted = 0u32;

        for pair in self.pairs.iter().cycle().take(attempts) {
            if submitted >= cap {
                break;
            }

            let amount = self.sample_amount(config);
            let balance = decimal_balance(&self.gateway, wallet.address(), &self.native_denom).await?;
            if amount > balance || amount < config.min_swap_amount {
                debug!(pair = %pair.symbol, amount, balance, "Swap attempt skipped");
                stats.swaps_skipped += 1;
                continue;
            }

            let receipt = self
                .swaps
                .perform_swap(
                    wallet,
                    &self.native_denom,
                    &pair.denom,
                    amount,
                    &pair.symbol,
                    submitted + 1,
                    cap,
                )
                .await?;

            if receipt.is_none() {
                stats.swaps_skipped += 1;
                continue;
            }
            submitted += 1;
            stats.swaps_submitted += 1;
            self.clock.sleep(config.action_delay()).await;
        }

        Ok(())
    }

    async fn swap_back_phase(
        &self,
        wallet: &Wallet,
        config: &RunConfig,
        stats: &mut RunStats,
    ) -> Result<()> {
        for pair in &self.pairs {
            let balance = decimal_balance(&self.gateway, wallet.address(), &pair.denom).await?;
            if balance <= SWAP_BACK_DUST {
                continue;
            }

            let amount = balance * SWAP_BACK_FRACTION;
            let receipt = self
                .swaps
                .perform_swap(wallet, &pair.denom, &self.native_denom, amount, &pair.symbol, 0, 0)
                .await?;
            if receipt.is_some() {
                stats.swap_backs += 1;
            }
            self.clock.sleep(config.action_delay()).await;
        }
        Ok(())
    }

    async fn liquidity_phase(
        &self,
        wallet: &Wallet,
        config: &RunConfig,
        stats: &mut RunStats,
    ) -> Result<()> {
        if self.pairs.is_empty() {
            return Ok(());
        }

        for round in 0..config.liquidity_round_count as usize {
            let pair = &self.pairs[round % self.pairs.len()];
            let outcome = self.liquidity.add_liquidity(wallet, pair, stats).await?;
            if let LiquidityOutcome::Skipped(reason) = outcome {
                debug!(pair = %pair.symbol, ?reason, "Liquidity round skipped");
                stats.liquidity_skipped += 1;
            }
            self.clock.sleep(config.action_delay()).await;
        }
        Ok(())
    }

    /// Uniform in `[min, max)`; `min` when the range is empty
    fn sample_amount(&self, config: &RunConfig) -> f64 {
        let (min, max) = (config.min_swap_amount, config.max_swap_amount);
        if min >= max {
            return min;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(min..max)
    }
}

//! Agent runner module
//!
//! Drives every wallet through the scheduler in repeated passes until the
//! run window closes.

use crate::chain::{ChainConnector, Gateway, RpcConnector};
use crate::clock::{Clock, SystemClock};
use crate::config::{AgentConfig, RunConfig};
use crate::dex::PoolState;
use crate::liquidity::LiquidityBalancer;
use crate::retry::RetryExecutor;
use crate::scheduler::{RunStats, WalletScheduler};
use crate::tokens::TokenPair;
use crate::wallet::Wallet;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub passes: u32,
    pub stats: RunStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Repeat `pass` until `window` has elapsed, pausing `pause` between passes.
///
/// The first pass always runs. Elapsed time is only checked between passes,
/// so a pass that is in flight when the window closes runs to completion.
/// Each pass receives its 1-based number and the stats so far and returns the
/// updated stats.
pub async fn run_for_duration<F, Fut>(
    clock: &dyn Clock,
    window: Duration,
    pause: Duration,
    mut pass: F,
) -> Result<RunReport>
where
    F: FnMut(u32, RunStats) -> Fut,
    Fut: Future<Output = Result<RunStats>>,
{
    let started_at = Utc::now();
    let start = clock.now();
    let mut stats = RunStats::default();
    let mut passes = 0u32;

    loop {
        passes += 1;
        info!(pass = passes, "Starting pass {}", passes);
        stats = pass(passes, stats).await?;

        if clock.now().duration_since(start) >= window {
            break;
        }
        clock.sleep(pause).await;
        if clock.now().duration_since(start) >= window {
            break;
        }
    }

    let elapsed = clock.now().duration_since(start);
    info!(passes, elapsed_secs = elapsed.as_secs(), "Run window closed");

    Ok(RunReport {
        passes,
        stats,
        started_at,
        finished_at: Utc::now(),
    })
}

/// Agent runner that owns the wallets and chain access for one run
pub struct AgentRunner {
    config: AgentConfig,
    run: RunConfig,
    wallets: Vec<Wallet>,
    gateway: Arc<Gateway>,
    clock: Arc<dyn Clock>,
}

impl AgentRunner {
    /// Runner against the configured RPC endpoint, using wall-clock time
    pub fn new(config: AgentConfig, run: RunConfig, wallets: Vec<Wallet>) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let connector = RpcConnector::new(&config.network, &config.timing, clock.clone())?;
        Ok(Self::with_connector(
            config,
            run,
            wallets,
            Arc::new(connector),
            clock,
        ))
    }

    pub fn with_connector(
        config: AgentConfig,
        run: RunConfig,
        wallets: Vec<Wallet>,
        connector: Arc<dyn ChainConnector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let executor = RetryExecutor::new(clock.clone(), config.timing.retry_delay());
        Self {
            gateway: Arc::new(Gateway::new(connector, executor)),
            config,
            run,
            wallets,
            clock,
        }
    }

    fn scheduler(&self) -> WalletScheduler {
        WalletScheduler::new(
            self.gateway.clone(),
            self.config.pairs.clone(),
            &self.config.network,
            self.clock.clone(),
        )
    }

    /// Process every wallet in order, pass after pass, until the window closes
    pub async fn run(&self) -> Result<RunReport> {
        self.config.validate()?;
        self.run.validate()?;
        if self.wallets.is_empty() {
            return Err(Error::Wallet("No wallets loaded".to_string()));
        }

        let scheduler = self.scheduler();
        self.run_with(&scheduler).await
    }

    async fn run_with(&self, scheduler: &WalletScheduler) -> Result<RunReport> {
        let total = self.wallets.len();
        let timing = &self.config.timing;

        info!(
            wallets = total,
            pairs = self.config.pairs.len(),
            window_secs = timing.run_window_secs,
            swaps = self.run.total_swap_count,
            lp_rounds = self.run.liquidity_round_count,
            swap_back = self.run.swap_back,
            "Starting agent run"
        );

        let wallets = &self.wallets;
        let run = &self.run;
        let report = run_for_duration(
            self.clock.as_ref(),
            timing.run_window(),
            timing.pass_pause(),
            |_, mut stats| async move {
                for (i, wallet) in wallets.iter().enumerate() {
                    scheduler
                        .process_wallet(wallet, run, i + 1, total, &mut stats)
                        .await?;
                }
                Ok::<_, Error>(stats)
            },
        )
        .await?;

        info!(
            passes = report.passes,
            swaps = report.stats.swaps_submitted,
            swap_backs = report.stats.swap_backs,
            liquidity_txs = report.stats.liquidity_txs,
            "Agent run finished"
        );
        Ok(report)
    }

    /// Current balances of every wallet, logged per wallet
    pub async fn report_balances(&self) -> Result<()> {
        let scheduler = self.scheduler();
        let total = self.wallets.len();
        for (i, wallet) in self.wallets.iter().enumerate() {
            info!("Wallet [{}/{}]: {}", i + 1, total, wallet.address());
            scheduler.report_balances(wallet).await?;
        }
        Ok(())
    }

    /// Reserves of every configured pair; `None` where the pool is unreadable
    pub async fn pools(&self) -> Result<Vec<(TokenPair, Option<PoolState>)>> {
        let balancer = LiquidityBalancer::new(self.gateway.clone(), &self.config.network);

        let mut pools = Vec::with_capacity(self.config.pairs.len());
        for pair in &self.config.pairs {
            let state = balancer.pool_state(pair).await?;
            pools.push((pair.clone(), state));
        }
        Ok(pools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_wallet, ManualClock, MockChain};
    use crate::tokens::NATIVE_DENOM;
    use serde_json::json;
    use tokio_test::assert_ok;

    fn run_config() -> RunConfig {
        RunConfig {
            min_swap_amount: 0.1,
            max_swap_amount: 0.2,
            total_swap_count: 2,
            liquidity_round_count: 1,
            action_delay_secs: 5,
            swap_back: false,
        }
    }

    #[tokio::test]
    async fn test_single_pass_when_pause_exceeds_window() {
        let clock = ManualClock::new();
        let report = run_for_duration(
            &clock,
            Duration::from_millis(1_000),
            Duration::from_secs(10),
            |_, stats| async move { Ok::<_, Error>(stats) },
        )
        .await
        .unwrap();

        assert_eq!(report.passes, 1);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(10)]);
    }

    #[tokio::test]
    async fn test_passes_repeat_until_window_closes() {
        let clock = ManualClock::new();
        let report = run_for_duration(
            &clock,
            Duration::from_millis(1_000),
            Duration::from_millis(300),
            |_, mut stats| async move {
                stats.wallets_processed += 1;
                Ok::<_, Error>(stats)
            },
        )
        .await
        .unwrap();

        // passes start at 0, 300, 600 and 900 ms
        assert_eq!(report.passes, 4);
        assert_eq!(report.stats.wallets_processed, 4);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_long_pass_finishes_without_trailing_pause() {
        let clock = ManualClock::new();
        let report = run_for_duration(
            &clock,
            Duration::from_millis(1_000),
            Duration::from_secs(10),
            |_, stats| {
                clock.advance(Duration::from_secs(2));
                async move { Ok::<_, Error>(stats) }
            },
        )
        .await
        .unwrap();

        assert_eq!(report.passes, 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_pass_error_aborts_run() {
        let clock = ManualClock::new();
        let result = run_for_duration(
            &clock,
            Duration::from_secs(60),
            Duration::from_secs(1),
            |pass, stats| async move {
                if pass == 2 {
                    Err(Error::Wallet("bad secret".to_string()))
                } else {
                    Ok(stats)
                }
            },
        )
        .await;

        assert!(matches!(result, Err(Error::Wallet(_))));
    }

    #[tokio::test]
    async fn test_runner_processes_all_wallets_each_pass() {
        let chain = MockChain::new();
        let clock = Arc::new(ManualClock::new());
        let wallets = vec![test_wallet(8), test_wallet(9)];
        for wallet in &wallets {
            chain.set_balance(wallet.address(), NATIVE_DENOM, 100_000_000);
        }

        let mut config = AgentConfig::default();
        // one pass: the action delays alone exceed the window
        config.timing.run_window_secs = 1;

        let runner = AgentRunner::with_connector(
            config,
            run_config(),
            wallets,
            Arc::new(chain.clone()),
            clock.clone(),
        );
        let report = assert_ok!(runner.run().await);

        assert_eq!(report.passes, 1);
        assert_eq!(report.stats.wallets_processed, 2);
        assert_eq!(report.stats.swaps_submitted, 4);
        // wallets hold no pair tokens, so liquidity rounds are skipped
        assert_eq!(report.stats.liquidity_skipped, 2);
        assert_eq!(chain.executions().len(), 4);
    }

    #[tokio::test]
    async fn test_runner_rejects_empty_wallet_list() {
        let runner = AgentRunner::with_connector(
            AgentConfig::default(),
            run_config(),
            Vec::new(),
            Arc::new(MockChain::new()),
            Arc::new(ManualClock::new()),
        );
        assert!(matches!(runner.run().await, Err(Error::Wallet(_))));
    }

    #[tokio::test]
    async fn test_pools_reports_unreadable_pairs() {
        let chain = MockChain::new();
        let config = AgentConfig::default();
        let first = config.pairs[0].clone();
        chain.set_pool(
            &first.contract,
            json!({
                "assets": [
                    { "info": { "native_token": { "denom": first.denom } }, "amount": "3000000" },
                    { "info": { "native_token": { "denom": "uzig" } }, "amount": "1000000" }
                ],
                "total_share": "1"
            }),
        );

        let runner = AgentRunner::with_connector(
            config,
            run_config(),
            Vec::new(),
            Arc::new(chain),
            Arc::new(ManualClock::new()),
        );
        let pools = runner.pools().await.unwrap();

        assert_eq!(pools.len(), 5);
        assert_eq!(pools[0].1.and_then(|p| p.ratio()), Some(3.0));
        assert!(pools[1..].iter().all(|(_, state)| state.is_none()));
    }
}

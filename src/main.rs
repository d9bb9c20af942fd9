//! Oroswap Agent CLI
//!
//! Command-line interface for running the swap and liquidity agent.

use clap::{Parser, Subcommand};
use oroswap_agent::config::parse_yes_no;
use oroswap_agent::wallet::{load_mnemonics, Wallet};
use oroswap_agent::{AgentConfig, AgentRunner, Result, RunConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "oroswap-agent")]
#[command(about = "Swap and liquidity agent for Oroswap on ZIGChain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run swap and liquidity passes for every wallet until the run window closes
    Run {
        /// File with one mnemonic per line
        #[arg(short, long, default_value = "wallet.txt")]
        wallets: PathBuf,

        /// Minimum swap amount, in ZIG
        #[arg(long, default_value_t = 0.01)]
        min_swap: f64,

        /// Maximum swap amount, in ZIG
        #[arg(long, default_value_t = 0.05)]
        max_swap: f64,

        /// Swaps per wallet per pass, across all pairs
        #[arg(long, default_value_t = 5)]
        swaps: u32,

        /// Liquidity actions per wallet per pass
        #[arg(long, default_value_t = 2)]
        lp_rounds: u32,

        /// Seconds to wait after each action
        #[arg(long, default_value_t = 10)]
        delay: u64,

        /// Swap half of each token back to ZIG after the swap rounds (yes/no)
        #[arg(long, default_value = "yes", value_parser = parse_yes_no, action = clap::ArgAction::Set)]
        swap_back: bool,
    },

    /// Show reserves and price ratio of every configured pair
    Pools,

    /// Show token and ZIG balances of every wallet
    Balances {
        /// File with one mnemonic per line
        #[arg(short, long, default_value = "wallet.txt")]
        wallets: PathBuf,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if cli.json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    let config = match &cli.config {
        Some(path) => AgentConfig::from_file(path)?,
        None => AgentConfig::from_env(),
    };
    config.validate()?;

    match cli.command {
        Commands::Run {
            wallets,
            min_swap,
            max_swap,
            swaps,
            lp_rounds,
            delay,
            swap_back,
        } => {
            let run = RunConfig {
                min_swap_amount: min_swap,
                max_swap_amount: max_swap,
                total_swap_count: swaps,
                liquidity_round_count: lp_rounds,
                action_delay_secs: delay,
                swap_back,
            };
            run_agent(config, run, &wallets).await?;
        }
        Commands::Pools => {
            show_pools(config).await?;
        }
        Commands::Balances { wallets } => {
            let wallets = load_wallets(&wallets, &config)?;
            AgentRunner::new(config, RunConfig::default(), wallets)?
                .report_balances()
                .await?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_wallets(path: &Path, config: &AgentConfig) -> Result<Vec<Wallet>> {
    let wallets = load_mnemonics(path)?
        .iter()
        .map(|mnemonic| Wallet::from_mnemonic(mnemonic, &config.network.address_prefix))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        path = %path.display(),
        count = wallets.len(),
        "Loaded wallets"
    );
    Ok(wallets)
}

async fn run_agent(config: AgentConfig, run: RunConfig, wallets_path: &Path) -> Result<()> {
    run.validate()?;
    let wallets = load_wallets(wallets_path, &config)?;

    tracing::info!(
        rpc = %config.network.rpc_url,
        wallets = wallets.len(),
        "Starting oroswap agent"
    );

    let runner = AgentRunner::new(config, run, wallets)?;
    let report = runner.run().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn show_pools(config: AgentConfig) -> Result<()> {
    let native_symbol = config.network.native_symbol.clone();
    let runner = AgentRunner::new(config, RunConfig::default(), Vec::new())?;

    println!(
        "{:<10} {:>20} {:>20} {:>14}",
        "PAIR", "TOKEN RESERVE", format!("{} RESERVE", native_symbol), "RATIO"
    );
    for (pair, state) in runner.pools().await? {
        match state {
            Some(pool) => println!(
                "{:<10} {:>20.6} {:>20.6} {:>14}",
                pair.symbol,
                pool.reserve_token,
                pool.reserve_native,
                pool.ratio()
                    .map(|r| format!("{:.6}", r))
                    .unwrap_or_else(|| "-".to_string())
            ),
            None => println!("{:<10} {:>20}", pair.symbol, "unavailable"),
        }
    }
    Ok(())
}

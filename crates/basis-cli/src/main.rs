// crates/basis-cli/src/main.rs
//
// CLI entrypoint for the Basis exchange.
//
// Every invocation loads the exchange snapshot, runs one operation through
// the single-writer handle, and saves the snapshot again if the operation
// changed state.

mod commands;
mod config;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use basis_core::{AccountId, Coins, Timestamp};
use commands::trade::QuoteSide;
use commands::Context;
use config::CliConfig;
use output::OutputFormat;

/// Basis CLI: constant-product exchange with a protected floor and staking rewards.
#[derive(Parser, Debug)]
#[command(
    name = "basis",
    version = "0.1.0",
    about = "Basis exchange CLI: trade, stake, and bridge fees into rewards"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.basis/config.toml")]
    config: String,

    /// Snapshot file; overrides `state_path` from the configuration.
    #[arg(long, global = true)]
    state: Option<String>,

    /// Unix timestamp to execute at (defaults to the current time).
    #[arg(long, global = true)]
    at: Option<Timestamp>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Deploy a fresh exchange from the `[genesis]` configuration.
    Init {
        /// Replace an existing snapshot.
        #[arg(long)]
        force: bool,
    },

    /// Credit native currency to an account (test faucet).
    Fund { account: AccountId, amount: Coins },

    /// Buy tokens with native currency.
    Buy {
        account: AccountId,
        /// Native currency to pay, fee included.
        amount: Coins,
        /// Fewest tokens to accept.
        #[arg(long, default_value = "0")]
        min_out: Coins,
    },

    /// Sell tokens for native currency.
    Sell {
        account: AccountId,
        /// Tokens to sell, fee included.
        amount: Coins,
        /// Least native currency to accept.
        #[arg(long, default_value = "0")]
        min_out: Coins,
    },

    /// Estimate a trade at current reserves.
    Quote {
        #[arg(value_enum)]
        side: QuoteSide,
        amount: Coins,
        /// Treat `amount` as the desired output and report the input needed.
        #[arg(long)]
        exact_out: bool,
    },

    /// Show the spot price.
    Price,

    /// Show reserves and accrued fees.
    Reserves,

    /// Move accrued fees into the reward pools.
    Drain,

    /// Stake tokens.
    Stake { account: AccountId, amount: Coins },

    /// Withdraw staked tokens.
    Withdraw { account: AccountId, amount: Coins },

    /// Claim accrued rewards.
    Claim { account: AccountId },

    /// Move tokens into the token reward pool.
    TopUp { account: AccountId, amount: Coins },

    /// Move native currency into the native reward pool.
    Deposit { account: AccountId, amount: Coins },

    /// Show a staker's rewards as of now.
    Earned { account: AccountId },

    /// Show an account's balances and stake.
    Balance { account: AccountId },

    /// Summary of the whole exchange.
    Status,

    /// Show committed events, newest last.
    Events {
        /// Number of most recent events to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Replay a scenario file against a fresh exchange.
    Simulate {
        scenario: PathBuf,
        /// Save the final state to the snapshot file.
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Configuration is read before tracing starts so its log level applies;
    // the outcome is logged once the subscriber is up.
    let loaded = CliConfig::load(&cli.config);
    let log_level = loaded
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut cli_config = match loaded {
        Ok(cfg) => {
            tracing::debug!("Loaded configuration from {}", cli.config);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                cli.config,
                e
            );
            CliConfig::default()
        }
    };

    // --state overrides the config file value.
    if let Some(state) = &cli.state {
        cli_config.state_path = state.clone();
    }

    let now = cli.at.unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as Timestamp);
    let ctx = Context {
        state_path: cli_config.state_file(),
        genesis: cli_config.genesis.clone(),
        now,
        format: cli.output,
    };

    match &cli.command {
        Commands::Init { force } => commands::init::run(&ctx, *force)?,
        Commands::Fund { account, amount } => commands::account::fund(&ctx, account, *amount)?,
        Commands::Buy { account, amount, min_out } => {
            commands::trade::buy(&ctx, account, *amount, *min_out)?
        }
        Commands::Sell { account, amount, min_out } => {
            commands::trade::sell(&ctx, account, *amount, *min_out)?
        }
        Commands::Quote { side, amount, exact_out } => {
            commands::trade::quote(&ctx, *side, *amount, *exact_out)?
        }
        Commands::Price => commands::trade::price(&ctx)?,
        Commands::Reserves => commands::trade::reserves(&ctx)?,
        Commands::Drain => commands::trade::drain(&ctx)?,
        Commands::Stake { account, amount } => commands::rewards::stake(&ctx, account, *amount)?,
        Commands::Withdraw { account, amount } => {
            commands::rewards::withdraw(&ctx, account, *amount)?
        }
        Commands::Claim { account } => commands::rewards::claim(&ctx, account)?,
        Commands::TopUp { account, amount } => commands::rewards::top_up(&ctx, account, *amount)?,
        Commands::Deposit { account, amount } => {
            commands::rewards::deposit(&ctx, account, *amount)?
        }
        Commands::Earned { account } => commands::rewards::earned(&ctx, account)?,
        Commands::Balance { account } => commands::account::balance(&ctx, account)?,
        Commands::Status => commands::status::status(&ctx)?,
        Commands::Events { limit } => commands::status::events(&ctx, *limit)?,
        Commands::Simulate { scenario, save } => commands::simulate::run(&ctx, scenario, *save)?,
    }

    Ok(())
}

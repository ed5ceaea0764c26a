// crates/basis-cli/src/commands/simulate.rs
//
// `basis simulate <scenario.toml>`: replay a scripted sequence of operations
// against a fresh exchange and report each step.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tabled::Tabled;

use basis_core::Coins;
use basis_exchange::{snapshot, Scenario, StatusReport, StepOutcome};

use super::Context;
use crate::output::{format_json, format_table, price_coins, OutputFormat};

#[derive(Serialize)]
struct SimulationReport<'a> {
    steps: &'a [StepOutcome],
    failed: usize,
    #[serde(rename = "final")]
    final_state: &'a StatusReport,
}

/// A row in the simulation results table.
#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "At")]
    at: u64,
    #[tabled(rename = "Op")]
    op: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&StepOutcome> for OutcomeRow {
    fn from(outcome: &StepOutcome) -> Self {
        Self {
            index: outcome.index,
            at: outcome.at,
            op: outcome.op.to_string(),
            account: outcome.account.clone().unwrap_or_else(|| "-".to_string()),
            result: match outcome.error {
                None => "ok".to_string(),
                Some(kind) => kind.to_string(),
            },
            detail: outcome.detail.clone(),
        }
    }
}

pub fn run(ctx: &Context, path: &Path, save: bool) -> Result<(), Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let scenario: Scenario = toml::from_str(&contents)?;
    let mut exchange = scenario.deploy()?;
    tracing::info!("Replaying {} steps from {}", scenario.steps.len(), path.display());

    let outcomes = scenario.run(&mut exchange);
    let failed = outcomes.iter().filter(|o| !o.ok).count();
    let status = exchange.status();

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&SimulationReport {
                steps: &outcomes,
                failed,
                final_state: &status,
            })
        ),
        OutputFormat::Table => {
            let rows: Vec<OutcomeRow> = outcomes.iter().map(OutcomeRow::from).collect();
            println!("{}", format_table(&rows));
            println!();
            println!(
                "{} steps, {} failed. Price {}, reserves {} native / {} tokens, \
                 staked {}, pools {} native / {} tokens",
                outcomes.len(),
                failed,
                status.price_q64.map(price_coins).unwrap_or_else(|| "-".to_string()),
                Coins(status.reserves.native_reserve),
                Coins(status.reserves.token_reserve),
                Coins(status.total_staked),
                Coins(status.native_reward_pool),
                Coins(status.token_reward_pool),
            );
        }
    }

    if save {
        snapshot::save(&exchange, &ctx.state_path)?;
        tracing::info!("Final state saved to {}", ctx.state_path.display());
    }
    Ok(())
}

// crates/basis-cli/src/commands/init.rs
//
// `basis init`: deploy a fresh exchange and write its first snapshot.

use basis_core::Coins;
use basis_exchange::{snapshot, Exchange};
use serde_json::json;

use super::Context;
use crate::output::{emit, timestamp, Field};

pub fn run(ctx: &Context, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if ctx.state_path.exists() && !force {
        return Err(format!(
            "{} already exists; pass --force to replace it",
            ctx.state_path.display()
        )
        .into());
    }

    let exchange = Exchange::genesis(ctx.genesis.clone(), ctx.now)?;
    snapshot::save(&exchange, &ctx.state_path)?;
    tracing::info!("Exchange deployed to {}", ctx.state_path.display());

    let reserves = exchange.get_reserves();
    let dev = ctx.genesis.dev_account_id()?;
    emit(
        ctx.format,
        &json!({
            "state_path": ctx.state_path.display().to_string(),
            "created_at": ctx.now,
            "dev_account": dev,
            "native_reserve": Coins(reserves.native_reserve),
            "token_reserve": Coins(reserves.token_reserve),
        }),
        vec![
            Field::new("Snapshot", ctx.state_path.display()),
            Field::new("Created", timestamp(ctx.now)),
            Field::new("Total supply", Coins(ctx.genesis.total_supply)),
            Field::new(
                "Dev allocation",
                format!("{} to {}", Coins(ctx.genesis.dev_allocation), dev.short()),
            ),
            Field::new("Token reserve", Coins(reserves.token_reserve)),
            Field::new("Native reserve (floor)", Coins(reserves.native_reserve)),
            Field::new("Fee", format!("{} bps", ctx.genesis.amm.fee_bps)),
        ],
    );
    Ok(())
}

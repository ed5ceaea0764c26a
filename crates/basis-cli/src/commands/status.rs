// crates/basis-cli/src/commands/status.rs
//
// `basis status` and `basis events`.

use basis_core::{Coins, MarketEvent};
use tabled::Tabled;

use super::Context;
use crate::output::{
    emit, format_json, format_table, optional_timestamp, price_coins, timestamp, Field,
    OutputFormat,
};

pub fn status(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let (report, created_at) = ctx.view(|ex| (ex.status(), ex.created_at()))?;
    let price = report
        .price_q64
        .map(price_coins)
        .unwrap_or_else(|| "-".to_string());
    emit(
        ctx.format,
        &report,
        vec![
            Field::new("Deployed", timestamp(created_at)),
            Field::new("Price (native/token)", price),
            Field::new("Native reserve", Coins(report.reserves.native_reserve)),
            Field::new("Token reserve", Coins(report.reserves.token_reserve)),
            Field::new("Floor", Coins(report.reserves.floor_value)),
            Field::new("Backed native", Coins(report.reserves.backed_native)),
            Field::new("Fees (native)", Coins(report.fee_in_native)),
            Field::new("Fees (tokens)", Coins(report.fee_in_token)),
            Field::new("Next drain", optional_timestamp(report.next_drain_at)),
            Field::new("Native reward pool", Coins(report.native_reward_pool)),
            Field::new("Token reward pool", Coins(report.token_reward_pool)),
            Field::new("Total staked", Coins(report.total_staked)),
            Field::new("Stakers", report.stakers),
            Field::new("Token supply", Coins(report.total_supply)),
            Field::new("Native in circulation", Coins(report.native_in_circulation)),
            Field::new("Events", report.events),
        ],
    );
    Ok(())
}

/// A row in the event log table.
#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "#")]
    seq: usize,
    #[tabled(rename = "Event")]
    name: String,
    #[tabled(rename = "Details")]
    details: String,
}

pub fn events(ctx: &Context, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let (total, recent): (usize, Vec<MarketEvent>) = ctx.view(|ex| {
        let all = ex.events();
        let start = all.len().saturating_sub(limit);
        (all.len(), all[start..].to_vec())
    })?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&recent)),
        OutputFormat::Table => {
            let first = total - recent.len();
            let rows: Vec<EventRow> = recent
                .iter()
                .enumerate()
                .map(|(i, event)| EventRow {
                    seq: first + i,
                    name: event.name().to_string(),
                    details: serde_json::to_string(event).unwrap_or_default(),
                })
                .collect();
            println!("{}", format_table(&rows));
        }
    }
    Ok(())
}

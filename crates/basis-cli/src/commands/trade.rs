// crates/basis-cli/src/commands/trade.rs
//
// `basis {buy, sell, quote, price, reserves, drain}`: pricing engine commands.

use basis_core::{AccountId, Coins, Direction};
use serde_json::json;

use super::Context;
use crate::output::{emit, optional_timestamp, price_coins, Field};

/// Trade side for `basis quote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum QuoteSide {
    /// Native in, tokens out.
    Buy,
    /// Tokens in, native out.
    Sell,
}

impl From<QuoteSide> for Direction {
    fn from(side: QuoteSide) -> Self {
        match side {
            QuoteSide::Buy => Direction::Buy,
            QuoteSide::Sell => Direction::Sell,
        }
    }
}

pub fn buy(
    ctx: &Context,
    account: &AccountId,
    amount: Coins,
    min_out: Coins,
) -> Result<(), Box<dyn std::error::Error>> {
    let quote = ctx.execute(|ex| ex.buy(account, amount.0, min_out.0, ctx.now))?;
    emit(
        ctx.format,
        &quote,
        vec![
            Field::new("Paid (native)", Coins(quote.native_in)),
            Field::new("Fee (native)", Coins(quote.fee)),
            Field::new("Into reserve", Coins(quote.net_in)),
            Field::new("Received (tokens)", Coins(quote.token_out)),
        ],
    );
    Ok(())
}

pub fn sell(
    ctx: &Context,
    account: &AccountId,
    amount: Coins,
    min_out: Coins,
) -> Result<(), Box<dyn std::error::Error>> {
    let quote = ctx.execute(|ex| ex.sell(account, amount.0, min_out.0, ctx.now))?;
    emit(
        ctx.format,
        &quote,
        vec![
            Field::new("Sold (tokens)", Coins(quote.token_in)),
            Field::new("Fee (tokens)", Coins(quote.fee)),
            Field::new("Burned (tokens)", Coins(quote.burned)),
            Field::new("Received (native)", Coins(quote.native_out)),
        ],
    );
    Ok(())
}

pub fn quote(
    ctx: &Context,
    side: QuoteSide,
    amount: Coins,
    exact_out: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let direction = Direction::from(side);
    let (amount_in, amount_out) = if exact_out {
        let needed = ctx.view(|ex| ex.estimate_in(direction, amount.0))??;
        (needed, amount.0)
    } else {
        let out = ctx.view(|ex| ex.estimate_out(direction, amount.0))??;
        (amount.0, out)
    };
    let (unit_in, unit_out) = match direction {
        Direction::Buy => ("native", "tokens"),
        Direction::Sell => ("tokens", "native"),
    };
    emit(
        ctx.format,
        &json!({
            "direction": direction,
            "amount_in": Coins(amount_in),
            "amount_out": Coins(amount_out),
        }),
        vec![
            Field::new("Direction", direction),
            Field::new(&format!("In ({})", unit_in), Coins(amount_in)),
            Field::new(&format!("Out ({})", unit_out), Coins(amount_out)),
        ],
    );
    Ok(())
}

pub fn price(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let price = ctx.view(|ex| ex.current_price())??;
    emit(
        ctx.format,
        &json!({ "price_q64": price.to_string(), "native_per_token": price_coins(price) }),
        vec![
            Field::new("Native per token", price_coins(price)),
            Field::new("Q64.64", price),
        ],
    );
    Ok(())
}

pub fn reserves(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let (reserves, fee_native, fee_token, next_drain) = ctx.view(|ex| {
        let fees = ex.fee_accrual();
        (
            ex.get_reserves(),
            fees.fee_in_native(),
            fees.fee_in_token(),
            ex.next_drain_at(),
        )
    })?;
    emit(
        ctx.format,
        &json!({
            "native_reserve": Coins(reserves.native_reserve),
            "token_reserve": Coins(reserves.token_reserve),
            "floor_value": Coins(reserves.floor_value),
            "backed_native": Coins(reserves.backed_native),
            "fee_in_native": Coins(fee_native),
            "fee_in_token": Coins(fee_token),
            "next_drain_at": next_drain,
        }),
        vec![
            Field::new("Native reserve", Coins(reserves.native_reserve)),
            Field::new("Token reserve", Coins(reserves.token_reserve)),
            Field::new("Floor", Coins(reserves.floor_value)),
            Field::new("Backed native", Coins(reserves.backed_native)),
            Field::new("Fees (native)", Coins(fee_native)),
            Field::new("Fees (tokens)", Coins(fee_token)),
            Field::new("Next drain", optional_timestamp(next_drain)),
        ],
    );
    Ok(())
}

pub fn drain(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let drained = ctx.execute(|ex| ex.drain_fees(ctx.now))?;
    emit(
        ctx.format,
        &drained,
        vec![
            Field::new("Token fees to pool", Coins(drained.token)),
            Field::new("Native fees to pool", Coins(drained.native)),
        ],
    );
    Ok(())
}

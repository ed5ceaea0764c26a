// crates/basis-amm/src/pricing.rs
//
// Constant-product pricing (x·y=k) without liquidity provision.
//
// `swap_output` is the single source of pricing truth: buys, sells, and every
// estimate go through it. All intermediates are 256-bit and each result is
// truncated exactly once, so a trader is never overpaid and the rounding
// remainder always stays in the reserves.

use serde::{Deserialize, Serialize};

use basis_core::{
    bps_of, mul_div, mul_div_ceil, Amount, BasisError, BPS_DENOMINATOR, PRICE_PRECISION,
};

use crate::reserves::ReservePair;

/// Output of a constant-product swap.
///
/// ```text
/// output = input * output_reserve / (input_reserve + input)
/// ```
///
/// # Errors
/// `InsufficientFunds` if either reserve is empty, `InvalidInput` for a zero input.
pub fn swap_output(
    input_amount: Amount,
    input_reserve: Amount,
    output_reserve: Amount,
) -> Result<Amount, BasisError> {
    if input_reserve == 0 || output_reserve == 0 {
        return Err(BasisError::InsufficientFunds(
            "swap against an empty reserve".to_string(),
        ));
    }
    if input_amount == 0 {
        return Err(BasisError::InvalidInput("swap input must be nonzero".to_string()));
    }
    let denominator = input_reserve
        .checked_add(input_amount)
        .ok_or_else(|| BasisError::Arithmetic("reserve plus input overflows".to_string()))?;
    mul_div(input_amount, output_reserve, denominator)
}

/// Spot price of one token in native currency, as Q64.64.
///
/// ```text
/// price = native_reserve * 2^64 / token_reserve
/// ```
pub fn current_price(reserves: &ReservePair) -> Result<u128, BasisError> {
    if reserves.token_reserve() == 0 {
        return Err(BasisError::InsufficientFunds("token reserve is empty".to_string()));
    }
    mul_div(reserves.native_reserve(), PRICE_PRECISION, reserves.token_reserve())
}

/// Rejects a trade whose reserve change is below the resolution of the
/// Q64.64 price. Every accepted trade moves the quoted price.
fn ensure_price_moves(
    reserves: &ReservePair,
    native_after: Amount,
    token_after: Amount,
) -> Result<(), BasisError> {
    let before = current_price(reserves)?;
    let after = mul_div(native_after, PRICE_PRECISION, token_after)?;
    if after == before {
        return Err(BasisError::InvalidInput(
            "trade is too small to move the price".to_string(),
        ));
    }
    Ok(())
}

/// A priced buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyQuote {
    /// Gross native paid by the buyer.
    pub native_in: Amount,
    /// Native fee retained for the reward pools.
    pub fee: Amount,
    /// Native that joins the reserve (`native_in - fee`).
    pub net_in: Amount,
    pub token_out: Amount,
}

/// Price a buy with the fee removed from the native input first.
///
/// ```text
/// fee       = native_in * fee_bps / 10_000
/// net_in    = native_in - fee
/// token_out = swap_output(net_in, native_reserve, token_reserve)
/// ```
///
/// # Errors
/// `InvalidInput` for zero input, an output that truncates to zero, or a
/// trade too small to move the price. `InsufficientFunds` when the token
/// reserve is empty or would be exhausted.
pub fn quote_buy(
    reserves: &ReservePair,
    fee_bps: u32,
    native_in: Amount,
) -> Result<BuyQuote, BasisError> {
    if native_in == 0 {
        return Err(BasisError::InvalidInput("buy amount must be nonzero".to_string()));
    }
    if reserves.token_reserve() == 0 {
        return Err(BasisError::InsufficientFunds("token reserve is empty".to_string()));
    }
    let fee = bps_of(native_in, fee_bps)?;
    let net_in = native_in - fee;
    if net_in == 0 {
        return Err(BasisError::InvalidInput("buy amount is consumed by the fee".to_string()));
    }
    let token_out = swap_output(net_in, reserves.native_reserve(), reserves.token_reserve())?;
    if token_out == 0 {
        return Err(BasisError::InvalidInput("buy is too small to yield any token".to_string()));
    }
    if token_out > reserves.token_reserve() {
        return Err(BasisError::InsufficientFunds(format!(
            "token reserve {} cannot cover {}",
            reserves.token_reserve(),
            token_out
        )));
    }
    let native_after = reserves
        .native_reserve()
        .checked_add(net_in)
        .ok_or_else(|| BasisError::Arithmetic("native reserve overflows".to_string()))?;
    ensure_price_moves(reserves, native_after, reserves.token_reserve() - token_out)?;
    Ok(BuyQuote {
        native_in,
        fee,
        net_in,
        token_out,
    })
}

/// A priced sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellQuote {
    /// Gross tokens given up by the seller.
    pub token_in: Amount,
    /// Tokens kept as the fee for the reward pools.
    pub fee: Amount,
    /// Tokens destroyed (`token_in - fee`).
    pub burned: Amount,
    pub native_out: Amount,
}

/// Price a sell on the gross token input; the fee is then taken in tokens.
///
/// ```text
/// native_out = swap_output(token_in, token_reserve, native_reserve)
/// fee        = token_in * fee_bps / 10_000
/// burned     = token_in - fee
/// ```
///
/// # Errors
/// `GuardViolation(ReserveFloor)` when the native reserve is already at the
/// floor or `native_out` would take it there, whatever the slippage bound.
/// `InvalidInput` for a zero, dust, or price-neutral sell.
pub fn quote_sell(
    reserves: &ReservePair,
    fee_bps: u32,
    token_in: Amount,
) -> Result<SellQuote, BasisError> {
    if token_in == 0 {
        return Err(BasisError::InvalidInput("sell amount must be nonzero".to_string()));
    }
    reserves.check_floor(0)?;
    let native_out = swap_output(token_in, reserves.token_reserve(), reserves.native_reserve())?;
    reserves.check_floor(native_out)?;
    if native_out == 0 {
        return Err(BasisError::InvalidInput(
            "sell is too small to yield any native currency".to_string(),
        ));
    }
    ensure_price_moves(
        reserves,
        reserves.native_reserve() - native_out,
        reserves.token_reserve(),
    )?;
    let fee = bps_of(token_in, fee_bps)?;
    Ok(SellQuote {
        token_in,
        fee,
        burned: token_in - fee,
        native_out,
    })
}

/// Smallest gross native input whose buy yields at least `token_out`.
///
/// Inverts the swap with a ceiling division, then grosses up for the fee and
/// walks the result against the fee's own truncation so that
/// `quote_buy(result).token_out >= token_out` and `result - 1` falls short.
/// Fails like the buy itself when that input would be rejected.
pub fn buy_input_for(
    reserves: &ReservePair,
    fee_bps: u32,
    token_out: Amount,
) -> Result<Amount, BasisError> {
    if token_out == 0 {
        return Err(BasisError::InvalidInput("desired output must be nonzero".to_string()));
    }
    if token_out >= reserves.token_reserve() {
        return Err(BasisError::InsufficientFunds(format!(
            "token reserve {} cannot cover {}",
            reserves.token_reserve(),
            token_out
        )));
    }
    let net_needed = mul_div_ceil(
        token_out,
        reserves.native_reserve(),
        reserves.token_reserve() - token_out,
    )?;

    let keep = BPS_DENOMINATOR - fee_bps as u128;
    let net_of =
        |gross: Amount| -> Result<Amount, BasisError> { Ok(gross - bps_of(gross, fee_bps)?) };

    let mut gross = mul_div_ceil(net_needed, BPS_DENOMINATOR, keep)?;
    while gross > net_needed && net_of(gross - 1)? >= net_needed {
        gross -= 1;
    }
    while net_of(gross)? < net_needed {
        gross = gross
            .checked_add(1)
            .ok_or_else(|| BasisError::Arithmetic("buy input overflows".to_string()))?;
    }
    quote_buy(reserves, fee_bps, gross)?;
    Ok(gross)
}

/// Smallest token input whose sell yields at least `native_out`.
///
/// The sell fee is taken from the token side after pricing, so it does not
/// change the input needed.
pub fn sell_input_for(reserves: &ReservePair, native_out: Amount) -> Result<Amount, BasisError> {
    if native_out == 0 {
        return Err(BasisError::InvalidInput("desired output must be nonzero".to_string()));
    }
    reserves.check_floor(native_out)?;
    if reserves.token_reserve() == 0 {
        return Err(BasisError::InsufficientFunds("token reserve is empty".to_string()));
    }
    // A larger payout only lowers the price further.
    ensure_price_moves(
        reserves,
        reserves.native_reserve() - native_out,
        reserves.token_reserve(),
    )?;
    mul_div_ceil(
        native_out,
        reserves.token_reserve(),
        reserves.native_reserve() - native_out,
    )
}

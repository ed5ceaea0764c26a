// crates/basis-cli/src/commands/rewards.rs
//
// `basis {stake, withdraw, claim, top-up, deposit, earned}`: reward engine commands.

use basis_core::{AccountId, Coins};
use serde_json::json;

use super::Context;
use crate::output::{emit, optional_timestamp, Field};

pub fn stake(
    ctx: &Context,
    account: &AccountId,
    amount: Coins,
) -> Result<(), Box<dyn std::error::Error>> {
    let (staked, total) = ctx.execute(|ex| {
        ex.stake(account, amount.0, ctx.now)?;
        Ok((ex.staker(account).map(|r| r.amount).unwrap_or(0), ex.total_staked()))
    })?;
    report_stake(ctx, account, staked, total);
    Ok(())
}

pub fn withdraw(
    ctx: &Context,
    account: &AccountId,
    amount: Coins,
) -> Result<(), Box<dyn std::error::Error>> {
    let (staked, total) = ctx.execute(|ex| {
        ex.withdraw(account, amount.0, ctx.now)?;
        Ok((ex.staker(account).map(|r| r.amount).unwrap_or(0), ex.total_staked()))
    })?;
    report_stake(ctx, account, staked, total);
    Ok(())
}

fn report_stake(ctx: &Context, account: &AccountId, staked: u128, total: u128) {
    emit(
        ctx.format,
        &json!({ "account": account, "staked": Coins(staked), "total_staked": Coins(total) }),
        vec![
            Field::new("Account", account),
            Field::new("Staked", Coins(staked)),
            Field::new("Total staked", Coins(total)),
        ],
    );
}

pub fn claim(ctx: &Context, account: &AccountId) -> Result<(), Box<dyn std::error::Error>> {
    let (claimed, next) = ctx.execute(|ex| {
        let claimed = ex.claim(account, ctx.now)?;
        Ok((claimed, ex.next_claim_at(account)))
    })?;
    emit(
        ctx.format,
        &json!({
            "account": account,
            "native": Coins(claimed.native),
            "tokens": Coins(claimed.token),
            "next_claim_at": next,
        }),
        vec![
            Field::new("Native paid", Coins(claimed.native)),
            Field::new("Tokens paid", Coins(claimed.token)),
            Field::new("Next claim", optional_timestamp(next)),
        ],
    );
    Ok(())
}

pub fn top_up(
    ctx: &Context,
    account: &AccountId,
    amount: Coins,
) -> Result<(), Box<dyn std::error::Error>> {
    let pools = ctx.execute(|ex| {
        ex.top_up_token_pool(account, amount.0, ctx.now)?;
        Ok(ex.pools())
    })?;
    emit(
        ctx.format,
        &json!({ "token_reward_pool": Coins(pools.token_reward_pool) }),
        vec![Field::new("Token reward pool", Coins(pools.token_reward_pool))],
    );
    Ok(())
}

pub fn deposit(
    ctx: &Context,
    account: &AccountId,
    amount: Coins,
) -> Result<(), Box<dyn std::error::Error>> {
    let pools = ctx.execute(|ex| {
        ex.receive_native_funds(account, amount.0, ctx.now)?;
        Ok(ex.pools())
    })?;
    emit(
        ctx.format,
        &json!({ "native_reward_pool": Coins(pools.native_reward_pool) }),
        vec![Field::new("Native reward pool", Coins(pools.native_reward_pool))],
    );
    Ok(())
}

pub fn earned(ctx: &Context, account: &AccountId) -> Result<(), Box<dyn std::error::Error>> {
    let (native, token, next) = ctx.view(|ex| -> Result<_, basis_core::BasisError> {
        Ok((
            ex.earned_native(account, ctx.now)?,
            ex.earned_token(account, ctx.now)?,
            ex.next_claim_at(account),
        ))
    })??;
    emit(
        ctx.format,
        &json!({
            "account": account,
            "native": Coins(native),
            "tokens": Coins(token),
            "next_claim_at": next,
        }),
        vec![
            Field::new("Earned (native)", Coins(native)),
            Field::new("Earned (tokens)", Coins(token)),
            Field::new("Next claim", optional_timestamp(next)),
        ],
    );
    Ok(())
}

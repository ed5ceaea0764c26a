// crates/basis-cli/src/commands/account.rs
//
// `basis fund` and `basis balance`.

use basis_core::{AccountId, Coins};
use serde_json::json;

use super::Context;
use crate::output::{emit, optional_timestamp, Field};

pub fn fund(
    ctx: &Context,
    account: &AccountId,
    amount: Coins,
) -> Result<(), Box<dyn std::error::Error>> {
    let balance = ctx.execute(|ex| {
        ex.fund(account, amount.0)?;
        Ok(ex.native_balance(account))
    })?;
    emit(
        ctx.format,
        &json!({ "account": account, "funded": Coins(amount.0), "native_balance": Coins(balance) }),
        vec![
            Field::new("Account", account),
            Field::new("Funded", amount),
            Field::new("Native balance", Coins(balance)),
        ],
    );
    Ok(())
}

pub fn balance(ctx: &Context, account: &AccountId) -> Result<(), Box<dyn std::error::Error>> {
    let (native, tokens, staked, next_claim) = ctx.view(|ex| {
        (
            ex.native_balance(account),
            ex.token_balance(account),
            ex.staker(account).map(|r| r.amount).unwrap_or(0),
            ex.next_claim_at(account),
        )
    })?;
    emit(
        ctx.format,
        &json!({
            "account": account,
            "native": Coins(native),
            "tokens": Coins(tokens),
            "staked": Coins(staked),
            "next_claim_at": next_claim,
        }),
        vec![
            Field::new("Account", account),
            Field::new("Native", Coins(native)),
            Field::new("Tokens", Coins(tokens)),
            Field::new("Staked", Coins(staked)),
            Field::new("Next claim", optional_timestamp(next_claim)),
        ],
    );
    Ok(())
}

// crates/basis-exchange/src/scenario.rs
//
// Scripted replays: a start time, an optional genesis, and a list of
// timestamped operations by named accounts. Each step runs as its own
// transaction; a failed step is recorded and the replay carries on.

use serde::{Deserialize, Serialize};
use std::fmt;

use basis_core::{AccountId, BasisError, Coins, ErrorKind, Timestamp};

use crate::exchange::Exchange;
use crate::genesis::GenesisConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Credit native currency from outside the system.
    Fund,
    Buy,
    Sell,
    Stake,
    Withdraw,
    Claim,
    Drain,
    /// Move tokens into the token reward pool.
    TopUp,
    /// Move native currency into the native reward pool.
    Deposit,
    Settle,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Fund => "fund",
            Operation::Buy => "buy",
            Operation::Sell => "sell",
            Operation::Stake => "stake",
            Operation::Withdraw => "withdraw",
            Operation::Claim => "claim",
            Operation::Drain => "drain",
            Operation::TopUp => "top_up",
            Operation::Deposit => "deposit",
            Operation::Settle => "settle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Seconds after the scenario start.
    pub at: u64,
    pub op: Operation,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub amount: Option<Coins>,
    /// Slippage bound for buys and sells; zero when omitted.
    #[serde(default)]
    pub min_out: Option<Coins>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub start: Timestamp,
    #[serde(default)]
    pub genesis: GenesisConfig,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Result of one replayed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub index: usize,
    pub at: Timestamp,
    pub op: Operation,
    pub account: Option<String>,
    pub ok: bool,
    /// What happened, or the error message.
    pub detail: String,
    pub error: Option<ErrorKind>,
}

impl Scenario {
    /// Deploy the scenario's genesis at its start time.
    pub fn deploy(&self) -> Result<Exchange, BasisError> {
        Exchange::genesis(self.genesis.clone(), self.start)
    }

    /// Replay every step against `exchange`, in order.
    pub fn run(&self, exchange: &mut Exchange) -> Vec<StepOutcome> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let at = self.start.saturating_add(step.at);
                let (ok, detail, error) = match apply(exchange, step, at) {
                    Ok(detail) => (true, detail, None),
                    Err(e) => (false, e.to_string(), Some(e.kind())),
                };
                StepOutcome {
                    index,
                    at,
                    op: step.op,
                    account: step.account.clone(),
                    ok,
                    detail,
                    error,
                }
            })
            .collect()
    }
}

fn apply(exchange: &mut Exchange, step: &Step, now: Timestamp) -> Result<String, BasisError> {
    let account = || -> Result<AccountId, BasisError> {
        step.account
            .as_deref()
            .ok_or_else(|| BasisError::InvalidInput(format!("{} needs an account", step.op)))?
            .parse()
    };
    let amount = || -> Result<u128, BasisError> {
        step.amount
            .map(|c| c.0)
            .ok_or_else(|| BasisError::InvalidInput(format!("{} needs an amount", step.op)))
    };
    let min_out = step.min_out.map(|c| c.0).unwrap_or(0);

    match step.op {
        Operation::Fund => {
            let amount = amount()?;
            exchange.fund(&account()?, amount)?;
            Ok(format!("funded {} native", Coins(amount)))
        }
        Operation::Buy => {
            let quote = exchange.buy(&account()?, amount()?, min_out, now)?;
            Ok(format!(
                "paid {} native (fee {}), got {} tokens",
                Coins(quote.native_in),
                Coins(quote.fee),
                Coins(quote.token_out)
            ))
        }
        Operation::Sell => {
            let quote = exchange.sell(&account()?, amount()?, min_out, now)?;
            Ok(format!(
                "sold {} tokens (fee {}, burned {}), got {} native",
                Coins(quote.token_in),
                Coins(quote.fee),
                Coins(quote.burned),
                Coins(quote.native_out)
            ))
        }
        Operation::Stake => {
            let amount = amount()?;
            exchange.stake(&account()?, amount, now)?;
            Ok(format!("staked {}", Coins(amount)))
        }
        Operation::Withdraw => {
            let amount = amount()?;
            exchange.withdraw(&account()?, amount, now)?;
            Ok(format!("withdrew {}", Coins(amount)))
        }
        Operation::Claim => {
            let claimed = exchange.claim(&account()?, now)?;
            Ok(format!(
                "claimed {} native, {} tokens",
                Coins(claimed.native),
                Coins(claimed.token)
            ))
        }
        Operation::Drain => {
            let drained = exchange.drain_fees(now)?;
            Ok(format!(
                "drained {} tokens, {} native",
                Coins(drained.token),
                Coins(drained.native)
            ))
        }
        Operation::TopUp => {
            let amount = amount()?;
            exchange.top_up_token_pool(&account()?, amount, now)?;
            Ok(format!("token pool +{}", Coins(amount)))
        }
        Operation::Deposit => {
            let amount = amount()?;
            exchange.receive_native_funds(&account()?, amount, now)?;
            Ok(format!("native pool +{}", Coins(amount)))
        }
        Operation::Settle => {
            let staker = match step.account {
                Some(_) => Some(account()?),
                None => None,
            };
            exchange.settle(staker.as_ref(), now)?;
            Ok("settled".to_string())
        }
    }
}

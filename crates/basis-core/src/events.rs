// crates/basis-core/src/events.rs
//
// Observability events. They describe committed state transitions and carry
// no behaviour: engines buffer them during an operation and the exchange
// publishes them only if the enclosing transaction commits.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::Amount;
use crate::identity::AccountId;
use crate::Timestamp;

/// Trade direction relative to the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Native currency in, tokens out.
    Buy,
    /// Tokens in, native currency out.
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
        }
    }
}

/// Denomination of a fee or reward stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Native,
    Token,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Serialised externally tagged (`{"fee_accrued": {...}}`); internally tagged
/// enums cannot carry `u128` fields through serde_json.
#[serde(rename_all = "snake_case")]
pub enum MarketEvent {
    TradeExecuted {
        trader: AccountId,
        direction: Direction,
        amount_in: Amount,
        amount_out: Amount,
        fee: Amount,
        at: Timestamp,
    },
    ReservesUpdated {
        native_reserve: Amount,
        token_reserve: Amount,
    },
    FeeAccrued {
        currency: Currency,
        amount: Amount,
    },
    FeeDrained {
        token_amount: Amount,
        native_amount: Amount,
        at: Timestamp,
    },
    StakeChanged {
        staker: AccountId,
        /// The staker's stake after the change.
        amount: Amount,
        total_staked: Amount,
    },
    RewardSettled {
        staker: Option<AccountId>,
        native_reward_per_unit: u128,
        token_reward_per_unit: u128,
        at: Timestamp,
    },
    RewardPaid {
        staker: AccountId,
        native_amount: Amount,
        token_amount: Amount,
        at: Timestamp,
    },
}

impl MarketEvent {
    /// Short snake_case name of the event kind.
    pub fn name(&self) -> &'static str {
        match self {
            MarketEvent::TradeExecuted { .. } => "trade_executed",
            MarketEvent::ReservesUpdated { .. } => "reserves_updated",
            MarketEvent::FeeAccrued { .. } => "fee_accrued",
            MarketEvent::FeeDrained { .. } => "fee_drained",
            MarketEvent::StakeChanged { .. } => "stake_changed",
            MarketEvent::RewardSettled { .. } => "reward_settled",
            MarketEvent::RewardPaid { .. } => "reward_paid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = MarketEvent::FeeAccrued {
            currency: Currency::Token,
            amount: 30,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.starts_with(r#"{"fee_accrued":"#));
        assert!(json.contains(r#""currency":"token""#));
        assert_eq!(event.name(), "fee_accrued");
    }

    #[test]
    fn test_event_with_wide_amounts_parses_back() {
        let event = MarketEvent::ReservesUpdated {
            native_reserve: u128::MAX,
            token_reserve: 900_000 * 10u128.pow(18),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}

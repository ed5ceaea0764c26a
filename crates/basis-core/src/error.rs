// crates/basis-core/src/error.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::amount::Amount;
use crate::ledger::LedgerError;
use crate::Timestamp;

/// Exchange-wide error type.
///
/// Every rejection surfaces one of these; the enclosing transaction is
/// discarded as a unit and nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BasisError {
    /// Zero amounts, malformed parameters, invalid configuration.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller balance, reserve, or reward pool below the required amount.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Computed output violates the caller's bound.
    #[error("Slippage exceeded: minimum {minimum}, actual {actual}")]
    SlippageExceeded { minimum: Amount, actual: Amount },

    /// Reentrancy, cooldown, reserve floor, or missing destination.
    #[error("Guard violation: {0}")]
    GuardViolation(Guard),

    /// A downstream value transfer failed.
    #[error("Transfer failure: {0}")]
    TransferFailure(String),

    /// Checked arithmetic overflowed.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Which guard rejected an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Guard {
    /// A state-mutating operation was entered while another was in progress.
    Reentrancy,
    /// A cooldown has not elapsed; the operation is allowed from `ready_at`.
    Cooldown { ready_at: Timestamp },
    /// A sell would leave the native reserve at or below the floor.
    ReserveFloor,
    /// The fee bridge has no reward destination wired.
    DestinationNotConfigured,
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Reentrancy => write!(f, "reentrant call"),
            Guard::Cooldown { ready_at } => write!(f, "cooldown active until {}", ready_at),
            Guard::ReserveFloor => write!(f, "native reserve floor reached"),
            Guard::DestinationNotConfigured => write!(f, "reward destination not configured"),
        }
    }
}

/// Coarse error category, for callers that branch on the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    InsufficientFunds,
    SlippageExceeded,
    GuardViolation,
    TransferFailure,
    Arithmetic,
    NotFound,
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl BasisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BasisError::InvalidInput(_) => ErrorKind::InvalidInput,
            BasisError::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            BasisError::SlippageExceeded { .. } => ErrorKind::SlippageExceeded,
            BasisError::GuardViolation(_) => ErrorKind::GuardViolation,
            BasisError::TransferFailure(_) => ErrorKind::TransferFailure,
            BasisError::Arithmetic(_) => ErrorKind::Arithmetic,
            BasisError::NotFound(_) => ErrorKind::NotFound,
            BasisError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    pub fn cooldown(ready_at: Timestamp) -> Self {
        BasisError::GuardViolation(Guard::Cooldown { ready_at })
    }
}

impl From<LedgerError> for BasisError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientBalance { .. } => BasisError::InsufficientFunds(e.to_string()),
            LedgerError::Overflow(_) => BasisError::Arithmetic(e.to_string()),
            LedgerError::RecipientRejected(_) => BasisError::TransferFailure(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for BasisError {
    fn from(e: serde_json::Error) -> Self {
        BasisError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AccountId;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(BasisError::cooldown(5).kind(), ErrorKind::GuardViolation);
        assert_eq!(
            BasisError::SlippageExceeded { minimum: 2, actual: 1 }.kind(),
            ErrorKind::SlippageExceeded
        );
    }

    #[test]
    fn test_ledger_error_conversion() {
        let short = LedgerError::InsufficientBalance {
            account: AccountId::from_label("alice"),
            required: 10,
            available: 3,
        };
        assert_eq!(BasisError::from(short).kind(), ErrorKind::InsufficientFunds);

        let rejected = LedgerError::RecipientRejected(AccountId::from_label("vault"));
        assert_eq!(BasisError::from(rejected).kind(), ErrorKind::TransferFailure);
    }

    #[test]
    fn test_display_includes_guard() {
        let e = BasisError::cooldown(1_700_000_000);
        assert_eq!(e.to_string(), "Guard violation: cooldown active until 1700000000");
    }
}

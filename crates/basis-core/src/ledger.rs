// crates/basis-core/src/ledger.rs
//
// The fungible-token and native-currency ledger collaborator.
//
// The engines never own balances directly; they move value through these
// traits. `InMemoryLedger` is the reference implementation used by the
// exchange, the CLI, and the tests.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::amount::Amount;
use crate::identity::AccountId;

/// Failures reported by a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("account {account:?} holds {available}, needs {required}")]
    InsufficientBalance {
        account: AccountId,
        required: Amount,
        available: Amount,
    },

    /// The recipient refused the transfer (its receive hook failed).
    #[error("recipient {0:?} rejected the transfer")]
    RecipientRejected(AccountId),

    #[error("ledger overflow: {0}")]
    Overflow(String),
}

/// Standard fungible-token ledger operations.
pub trait TokenLedger {
    fn token_balance(&self, account: &AccountId) -> Amount;

    fn total_supply(&self) -> Amount;

    fn transfer_token(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Destroy `amount` held by `from`, reducing total supply.
    fn burn_token(&mut self, from: &AccountId, amount: Amount) -> Result<(), LedgerError>;

    fn mint_token(&mut self, to: &AccountId, amount: Amount) -> Result<(), LedgerError>;
}

/// Native settlement currency balances.
pub trait NativeLedger {
    fn native_balance(&self, account: &AccountId) -> Amount;

    fn transfer_native(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;
}

/// Both ledgers behind one handle.
pub trait Ledger: TokenLedger + NativeLedger {}

impl<T: TokenLedger + NativeLedger> Ledger for T {}

/// BTreeMap-backed ledger. Cloneable so a transaction can run on a copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryLedger {
    tokens: BTreeMap<AccountId, Amount>,
    native: BTreeMap<AccountId, Amount>,
    total_supply: Amount,
    /// Accounts whose native receive hook fails.
    #[serde(default)]
    rejects_native: BTreeSet<AccountId>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit native currency from outside the system (a faucet).
    ///
    /// Only genesis, simulations, and tests use this.
    pub fn deposit_native(&mut self, to: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        credit(&mut self.native, to, amount)
    }

    /// Make every future native transfer to `account` fail (or succeed again).
    pub fn set_rejects_native(&mut self, account: &AccountId, rejects: bool) {
        if rejects {
            self.rejects_native.insert(*account);
        } else {
            self.rejects_native.remove(account);
        }
    }

    /// Sum of all native balances.
    pub fn native_in_circulation(&self) -> Amount {
        self.native.values().sum()
    }
}

fn debit(
    balances: &mut BTreeMap<AccountId, Amount>,
    account: &AccountId,
    amount: Amount,
) -> Result<(), LedgerError> {
    let available = balances.get(account).copied().unwrap_or(0);
    if available < amount {
        return Err(LedgerError::InsufficientBalance {
            account: *account,
            required: amount,
            available,
        });
    }
    balances.insert(*account, available - amount);
    Ok(())
}

fn credit(
    balances: &mut BTreeMap<AccountId, Amount>,
    account: &AccountId,
    amount: Amount,
) -> Result<(), LedgerError> {
    let entry = balances.entry(*account).or_insert(0);
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| LedgerError::Overflow(format!("balance of {:?}", account)))?;
    Ok(())
}

impl TokenLedger for InMemoryLedger {
    fn token_balance(&self, account: &AccountId) -> Amount {
        self.tokens.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn transfer_token(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        debit(&mut self.tokens, from, amount)?;
        credit(&mut self.tokens, to, amount)
    }

    fn burn_token(&mut self, from: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        debit(&mut self.tokens, from, amount)?;
        self.total_supply -= amount;
        Ok(())
    }

    fn mint_token(&mut self, to: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow("total supply".to_string()))?;
        credit(&mut self.tokens, to, amount)
    }
}

impl NativeLedger for InMemoryLedger {
    fn native_balance(&self, account: &AccountId) -> Amount {
        self.native.get(account).copied().unwrap_or(0)
    }

    fn transfer_native(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if self.rejects_native.contains(to) {
            return Err(LedgerError::RecipientRejected(*to));
        }
        debit(&mut self.native, from, amount)?;
        credit(&mut self.native, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::from_label("alice")
    }

    fn bob() -> AccountId {
        AccountId::from_label("bob")
    }

    #[test]
    fn test_mint_and_transfer() {
        let mut ledger = InMemoryLedger::new();
        ledger.mint_token(&alice(), 100).unwrap();
        ledger.transfer_token(&alice(), &bob(), 40).unwrap();
        assert_eq!(ledger.token_balance(&alice()), 60);
        assert_eq!(ledger.token_balance(&bob()), 40);
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn test_transfer_insufficient_leaves_balances() {
        let mut ledger = InMemoryLedger::new();
        ledger.mint_token(&alice(), 10).unwrap();
        let result = ledger.transfer_token(&alice(), &bob(), 11);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(ledger.token_balance(&alice()), 10);
        assert_eq!(ledger.token_balance(&bob()), 0);
    }

    #[test]
    fn test_burn_reduces_supply() {
        let mut ledger = InMemoryLedger::new();
        ledger.mint_token(&alice(), 100).unwrap();
        ledger.burn_token(&alice(), 30).unwrap();
        assert_eq!(ledger.total_supply(), 70);
        assert_eq!(ledger.token_balance(&alice()), 70);
    }

    #[test]
    fn test_native_rejecting_recipient() {
        let mut ledger = InMemoryLedger::new();
        ledger.deposit_native(&alice(), 50).unwrap();
        ledger.set_rejects_native(&bob(), true);
        let result = ledger.transfer_native(&alice(), &bob(), 10);
        assert_eq!(result, Err(LedgerError::RecipientRejected(bob())));
        assert_eq!(ledger.native_balance(&alice()), 50);

        ledger.set_rejects_native(&bob(), false);
        ledger.transfer_native(&alice(), &bob(), 10).unwrap();
        assert_eq!(ledger.native_balance(&bob()), 10);
    }

    #[test]
    fn test_native_in_circulation() {
        let mut ledger = InMemoryLedger::new();
        ledger.deposit_native(&alice(), 5).unwrap();
        ledger.deposit_native(&bob(), 7).unwrap();
        ledger.transfer_native(&alice(), &bob(), 2).unwrap();
        assert_eq!(ledger.native_in_circulation(), 12);
    }
}

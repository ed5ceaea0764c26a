// crates/basis-staking/src/staker.rs
//
// Per-staker records, keyed by account. Records are created on first stake
// and never removed; a fully withdrawn staker keeps a zero-amount record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use basis_core::{AccountId, Amount, Timestamp};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerRecord {
    pub amount: Amount,
    pub native_reward_per_unit_paid: u128,
    pub token_reward_per_unit_paid: u128,
    pub accrued_native_reward: Amount,
    pub accrued_token_reward: Amount,
    /// `None` until the first claim.
    pub last_claim: Option<Timestamp>,
}

/// All staker records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerTable {
    records: BTreeMap<AccountId, StakerRecord>,
}

impl StakerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, staker: &AccountId) -> Option<&StakerRecord> {
        self.records.get(staker)
    }

    pub fn get_mut(&mut self, staker: &AccountId) -> Option<&mut StakerRecord> {
        self.records.get_mut(staker)
    }

    /// The staker's record, created empty if absent.
    pub fn entry(&mut self, staker: &AccountId) -> &mut StakerRecord {
        self.records.entry(*staker).or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &StakerRecord)> {
        self.records.iter()
    }

    /// Sum of all staked amounts; always equals the accumulator's total.
    /// Checked when a snapshot is loaded.
    pub fn total_amount(&self) -> Amount {
        self.records.values().map(|r| r.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creates_lazily() {
        let mut table = StakerTable::new();
        let alice = AccountId::from_label("alice");
        assert!(table.get(&alice).is_none());
        table.entry(&alice).amount = 10;
        assert_eq!(table.get(&alice).map(|r| r.amount), Some(10));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_total_amount() {
        let mut table = StakerTable::new();
        table.entry(&AccountId::from_label("a")).amount = 3;
        table.entry(&AccountId::from_label("b")).amount = 4;
        table.entry(&AccountId::from_label("c"));
        assert_eq!(table.total_amount(), 7);
        assert_eq!(table.len(), 3);
    }
}

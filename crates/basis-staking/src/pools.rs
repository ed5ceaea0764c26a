// crates/basis-staking/src/pools.rs
//
// The reward pools backing accrual: native currency deposited directly or
// bridged from buy fees, and tokens bridged from sell fees.

use serde::{Deserialize, Serialize};

use basis_core::{Amount, BasisError, Currency};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPools {
    pub native_reward_pool: Amount,
    pub token_reward_pool: Amount,
}

impl RewardPools {
    pub fn get(&self, currency: Currency) -> Amount {
        match currency {
            Currency::Native => self.native_reward_pool,
            Currency::Token => self.token_reward_pool,
        }
    }

    pub fn credit(&mut self, currency: Currency, amount: Amount) -> Result<(), BasisError> {
        let slot = self.slot(currency);
        *slot = slot
            .checked_add(amount)
            .ok_or_else(|| BasisError::Arithmetic(format!("{:?} reward pool overflow", currency)))?;
        Ok(())
    }

    /// Remove a payout, flooring at zero.
    ///
    /// The native pool can lag the custody balance if native arrives outside
    /// `receive_native_funds`; solvency is checked before this is called.
    pub fn debit(&mut self, currency: Currency, amount: Amount) {
        let slot = self.slot(currency);
        *slot = slot.saturating_sub(amount);
    }

    fn slot(&mut self, currency: Currency) -> &mut Amount {
        match currency {
            Currency::Native => &mut self.native_reward_pool,
            Currency::Token => &mut self.token_reward_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_and_debit() {
        let mut pools = RewardPools::default();
        pools.credit(Currency::Native, 10).unwrap();
        pools.credit(Currency::Token, 4).unwrap();
        pools.debit(Currency::Native, 3);
        assert_eq!(pools.get(Currency::Native), 7);
        assert_eq!(pools.get(Currency::Token), 4);
    }

    #[test]
    fn test_debit_floors_at_zero() {
        let mut pools = RewardPools::default();
        pools.credit(Currency::Token, 2).unwrap();
        pools.debit(Currency::Token, 5);
        assert_eq!(pools.token_reward_pool, 0);
    }
}

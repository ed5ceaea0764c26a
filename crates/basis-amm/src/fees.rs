// crates/basis-amm/src/fees.rs
//
// Fee accrual. Native fees come from buys, token fees from sells; both grow
// until the fee bridge drains them, at most once per cooldown interval.

use serde::{Deserialize, Serialize};

use basis_core::{Amount, BasisError, Timestamp};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAccrual {
    fee_in_token: Amount,
    fee_in_native: Amount,
    /// Time of the last successful drain; `None` until the first one.
    last_drain: Option<Timestamp>,
}

/// Fees taken out of the accrual by one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainedFees {
    pub token: Amount,
    pub native: Amount,
}

impl DrainedFees {
    pub fn is_empty(&self) -> bool {
        self.token == 0 && self.native == 0
    }
}

impl FeeAccrual {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fee_in_token(&self) -> Amount {
        self.fee_in_token
    }

    pub fn fee_in_native(&self) -> Amount {
        self.fee_in_native
    }

    pub fn last_drain(&self) -> Option<Timestamp> {
        self.last_drain
    }

    pub fn record_native(&mut self, fee: Amount) -> Result<(), BasisError> {
        self.fee_in_native = self
            .fee_in_native
            .checked_add(fee)
            .ok_or_else(|| BasisError::Arithmetic("native fee accrual overflow".to_string()))?;
        Ok(())
    }

    pub fn record_token(&mut self, fee: Amount) -> Result<(), BasisError> {
        self.fee_in_token = self
            .fee_in_token
            .checked_add(fee)
            .ok_or_else(|| BasisError::Arithmetic("token fee accrual overflow".to_string()))?;
        Ok(())
    }

    /// Earliest time the next drain is allowed; `None` means right away.
    pub fn next_drain_at(&self, cooldown_secs: u64) -> Option<Timestamp> {
        self.last_drain.map(|t| t.saturating_add(cooldown_secs))
    }

    /// # Errors
    /// `GuardViolation(Cooldown)` if `now` is before `next_drain_at`.
    pub fn check_cooldown(&self, now: Timestamp, cooldown_secs: u64) -> Result<(), BasisError> {
        match self.next_drain_at(cooldown_secs) {
            Some(ready_at) if now < ready_at => Err(BasisError::cooldown(ready_at)),
            _ => Ok(()),
        }
    }

    /// What a drain right now would take.
    pub fn pending(&self) -> DrainedFees {
        DrainedFees {
            token: self.fee_in_token,
            native: self.fee_in_native,
        }
    }

    /// Zero both counters and stamp the drain time.
    pub fn take(&mut self, now: Timestamp) -> DrainedFees {
        let drained = self.pending();
        self.fee_in_token = 0;
        self.fee_in_native = 0;
        self.last_drain = Some(now);
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_take() {
        let mut fees = FeeAccrual::new();
        fees.record_native(5).unwrap();
        fees.record_native(7).unwrap();
        fees.record_token(3).unwrap();

        let drained = fees.take(1_000);
        assert_eq!(drained, DrainedFees { token: 3, native: 12 });
        assert_eq!(fees.fee_in_native(), 0);
        assert_eq!(fees.fee_in_token(), 0);
        assert_eq!(fees.last_drain(), Some(1_000));
    }

    #[test]
    fn test_first_drain_has_no_cooldown() {
        let fees = FeeAccrual::new();
        assert_eq!(fees.next_drain_at(86_400), None);
        assert!(fees.check_cooldown(0, 86_400).is_ok());
    }

    #[test]
    fn test_cooldown_after_drain() {
        let mut fees = FeeAccrual::new();
        fees.take(1_000);
        assert_eq!(fees.check_cooldown(1_000 + 86_399, 86_400), Err(BasisError::cooldown(87_400)));
        assert!(fees.check_cooldown(1_000 + 86_400, 86_400).is_ok());
    }
}

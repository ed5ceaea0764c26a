// crates/basis-staking/src/accumulator.rs
//
// The Reward Accumulator: cumulative reward earned by one staked unit since
// inception, for each currency, scaled by REWARD_SCALE (Q18).
//
// Advancing uses the pool balance at settlement time:
//
//   delta = pool * elapsed * REWARD_SCALE / (total_staked * accrual_period_secs)
//
// so the rate is recomputed on every settlement rather than fixed for a
// reward period. Nothing here guarantees the pools cover everything accrued;
// the claim path checks solvency before paying.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use basis_core::amount::mul_div_wide;
use basis_core::{mul_div, Amount, BasisError, Timestamp, REWARD_SCALE};

use crate::pools::RewardPools;
use crate::staker::StakerRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAccumulator {
    pub total_staked: Amount,
    pub native_reward_per_unit: u128,
    pub token_reward_per_unit: u128,
    pub last_update: Timestamp,
}

/// Both accumulator values at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerUnit {
    pub native: u128,
    pub token: u128,
}

impl RewardAccumulator {
    pub fn new(now: Timestamp) -> Self {
        Self {
            last_update: now,
            ..Self::default()
        }
    }

    /// Accumulator values as they would be after settling at `now`.
    ///
    /// Nothing accrues while `total_staked` is zero, and a clock that runs
    /// backwards accrues nothing.
    pub fn projected(
        &self,
        pools: &RewardPools,
        now: Timestamp,
        accrual_period_secs: u64,
    ) -> Result<PerUnit, BasisError> {
        let current = self.per_unit();
        let elapsed = now.saturating_sub(self.last_update);
        if self.total_staked == 0 || elapsed == 0 {
            return Ok(current);
        }

        let time_scale = U256::from(elapsed) * U256::from(REWARD_SCALE);
        let denominator = U256::from(self.total_staked) * U256::from(accrual_period_secs);
        let delta = |pool: Amount| mul_div_wide(U256::from(pool), time_scale, denominator);

        let native = current
            .native
            .checked_add(delta(pools.native_reward_pool)?)
            .ok_or_else(|| BasisError::Arithmetic("native reward-per-unit overflow".to_string()))?;
        let token = current
            .token
            .checked_add(delta(pools.token_reward_pool)?)
            .ok_or_else(|| BasisError::Arithmetic("token reward-per-unit overflow".to_string()))?;
        Ok(PerUnit { native, token })
    }

    /// Bring both accumulators up to `now`.
    ///
    /// `last_update` moves to `now` even when nothing is staked, so an idle
    /// stretch is never credited to the next staker.
    pub fn advance(
        &mut self,
        pools: &RewardPools,
        now: Timestamp,
        accrual_period_secs: u64,
    ) -> Result<PerUnit, BasisError> {
        let next = self.projected(pools, now, accrual_period_secs)?;
        self.native_reward_per_unit = next.native;
        self.token_reward_per_unit = next.token;
        self.last_update = self.last_update.max(now);
        Ok(next)
    }

    pub fn per_unit(&self) -> PerUnit {
        PerUnit {
            native: self.native_reward_per_unit,
            token: self.token_reward_per_unit,
        }
    }
}

/// A staker's total rewards against the given accumulator values.
///
/// ```text
/// earned = amount * (current - paid) / REWARD_SCALE + accrued
/// ```
pub fn earned(record: &StakerRecord, per_unit: PerUnit) -> Result<(Amount, Amount), BasisError> {
    let owed = |current: u128, paid: u128, accrued: Amount| -> Result<Amount, BasisError> {
        let fresh = mul_div(record.amount, current.saturating_sub(paid), REWARD_SCALE)?;
        accrued
            .checked_add(fresh)
            .ok_or_else(|| BasisError::Arithmetic("accrued reward overflow".to_string()))
    };
    Ok((
        owed(per_unit.native, record.native_reward_per_unit_paid, record.accrued_native_reward)?,
        owed(per_unit.token, record.token_reward_per_unit_paid, record.accrued_token_reward)?,
    ))
}

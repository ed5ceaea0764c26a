// crates/basis-staking/src/config.rs

use serde::{Deserialize, Serialize};

use basis_core::BasisError;

/// Minimum interval between two claims by the same staker: one hour.
pub const DEFAULT_CLAIM_COOLDOWN_SECS: u64 = 3_600;

/// Time unit of the accrual rate: the whole pool per staked unit per hour.
pub const DEFAULT_ACCRUAL_PERIOD_SECS: u64 = 3_600;

/// Reward engine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default = "default_claim_cooldown_secs")]
    pub claim_cooldown_secs: u64,

    /// Divisor applied to elapsed time when advancing the accumulators.
    /// `1` gives the per-second rate `pool / total_staked`.
    #[serde(default = "default_accrual_period_secs")]
    pub accrual_period_secs: u64,
}

fn default_claim_cooldown_secs() -> u64 {
    DEFAULT_CLAIM_COOLDOWN_SECS
}

fn default_accrual_period_secs() -> u64 {
    DEFAULT_ACCRUAL_PERIOD_SECS
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            claim_cooldown_secs: default_claim_cooldown_secs(),
            accrual_period_secs: default_accrual_period_secs(),
        }
    }
}

impl RewardConfig {
    pub fn validate(&self) -> Result<(), BasisError> {
        if self.accrual_period_secs == 0 {
            return Err(BasisError::InvalidInput(
                "accrual_period_secs must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}

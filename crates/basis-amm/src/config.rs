// crates/basis-amm/src/config.rs
//
// Pricing engine parameters. Loaded from the `[genesis.amm]` table of the
// CLI configuration, or defaulted.

use serde::{Deserialize, Serialize};

use basis_core::amount::serde_coins;
use basis_core::{coins, Amount, BasisError, BPS_DENOMINATOR};

/// Trading fee: 30 bps (0.3%).
pub const DEFAULT_FEE_BPS: u32 = 30;

/// Minimum interval between fee drains: one day.
pub const DEFAULT_DRAIN_COOLDOWN_SECS: u64 = 86_400;

/// Default protected native reserve: 100 coins.
pub const DEFAULT_FLOOR_VALUE: Amount = coins(100);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmConfig {
    /// Fee in basis points, applied to the input side of every trade.
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u32,

    /// Initial (virtual) native reserve and the level sells may not reach.
    #[serde(default = "default_floor_value", with = "serde_coins")]
    pub floor_value: Amount,

    /// Seconds that must pass between two fee drains.
    #[serde(default = "default_drain_cooldown_secs")]
    pub drain_cooldown_secs: u64,
}

fn default_fee_bps() -> u32 {
    DEFAULT_FEE_BPS
}

fn default_floor_value() -> Amount {
    DEFAULT_FLOOR_VALUE
}

fn default_drain_cooldown_secs() -> u64 {
    DEFAULT_DRAIN_COOLDOWN_SECS
}

impl Default for AmmConfig {
    fn default() -> Self {
        Self {
            fee_bps: default_fee_bps(),
            floor_value: default_floor_value(),
            drain_cooldown_secs: default_drain_cooldown_secs(),
        }
    }
}

impl AmmConfig {
    /// # Errors
    /// `InvalidInput` if the fee is 100% or more, or the floor is zero.
    pub fn validate(&self) -> Result<(), BasisError> {
        if self.fee_bps as u128 >= BPS_DENOMINATOR {
            return Err(BasisError::InvalidInput(format!(
                "fee_bps {} must be below {}",
                self.fee_bps, BPS_DENOMINATOR
            )));
        }
        if self.floor_value == 0 {
            return Err(BasisError::InvalidInput(
                "floor_value must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AmmConfig::default();
        assert_eq!(config.fee_bps, 30);
        assert_eq!(config.floor_value, coins(100));
        assert_eq!(config.drain_cooldown_secs, 86_400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AmmConfig = serde_json::from_str(r#"{"floor_value":"2.5"}"#).unwrap();
        assert_eq!(config.fee_bps, DEFAULT_FEE_BPS);
        assert_eq!(config.floor_value, 2_500_000_000_000_000_000);
    }

    #[test]
    fn test_validate_rejects_full_fee() {
        let config = AmmConfig {
            fee_bps: 10_000,
            ..AmmConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

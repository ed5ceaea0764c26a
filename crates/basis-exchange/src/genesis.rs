// crates/basis-exchange/src/genesis.rs
//
// Deployment parameters. Loaded from the `[genesis]` table of the CLI
// configuration or a scenario file, or defaulted.

use serde::{Deserialize, Serialize};

use basis_amm::AmmConfig;
use basis_core::amount::serde_coins;
use basis_core::{coins, AccountId, Amount, BasisError};
use basis_staking::RewardConfig;

/// Tokens minted at genesis: one million coins.
pub const DEFAULT_TOTAL_SUPPLY: Amount = coins(1_000_000);

/// Tokens withheld from the pool for the developers: one hundred thousand coins.
pub const DEFAULT_DEV_ALLOCATION: Amount = coins(100_000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    #[serde(default = "default_total_supply", with = "serde_coins")]
    pub total_supply: Amount,

    /// Minted to `dev_account`; the rest of the supply seeds the token reserve.
    #[serde(default = "default_dev_allocation", with = "serde_coins")]
    pub dev_allocation: Amount,

    /// Label (or 64-char hex id) of the account receiving the dev allocation.
    #[serde(default = "default_dev_account")]
    pub dev_account: String,

    #[serde(default)]
    pub amm: AmmConfig,

    #[serde(default)]
    pub rewards: RewardConfig,
}

fn default_total_supply() -> Amount {
    DEFAULT_TOTAL_SUPPLY
}

fn default_dev_allocation() -> Amount {
    DEFAULT_DEV_ALLOCATION
}

fn default_dev_account() -> String {
    "dev".to_string()
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            total_supply: default_total_supply(),
            dev_allocation: default_dev_allocation(),
            dev_account: default_dev_account(),
            amm: AmmConfig::default(),
            rewards: RewardConfig::default(),
        }
    }
}

impl GenesisConfig {
    /// # Errors
    /// `InvalidInput` if the dev allocation leaves no token reserve, or if
    /// either engine's parameters are invalid.
    pub fn validate(&self) -> Result<(), BasisError> {
        if self.dev_allocation >= self.total_supply {
            return Err(BasisError::InvalidInput(format!(
                "dev_allocation {} must be below total_supply {}",
                basis_core::Coins(self.dev_allocation),
                basis_core::Coins(self.total_supply)
            )));
        }
        self.amm.validate()?;
        self.rewards.validate()
    }

    pub fn dev_account_id(&self) -> Result<AccountId, BasisError> {
        self.dev_account.parse()
    }

    /// Tokens placed in the pricing engine's reserve at genesis.
    pub fn token_reserve(&self) -> Amount {
        self.total_supply.saturating_sub(self.dev_allocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reserve() {
        let config = GenesisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.token_reserve(), coins(900_000));
    }

    #[test]
    fn test_rejects_allocation_of_whole_supply() {
        let config = GenesisConfig {
            dev_allocation: coins(1_000_000),
            ..GenesisConfig::default()
        };
        assert!(matches!(config.validate(), Err(BasisError::InvalidInput(_))));
    }

    #[test]
    fn test_partial_table_uses_defaults() {
        let config: GenesisConfig = serde_json::from_str(
            r#"{"total_supply": 500, "amm": {"fee_bps": 50}}"#,
        )
        .unwrap();
        assert_eq!(config.total_supply, coins(500));
        assert_eq!(config.dev_allocation, DEFAULT_DEV_ALLOCATION);
        assert_eq!(config.amm.fee_bps, 50);
        assert_eq!(config.amm.floor_value, coins(100));
        assert_eq!(config.rewards, RewardConfig::default());
    }
}

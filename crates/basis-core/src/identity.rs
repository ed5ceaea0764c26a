// crates/basis-core/src/identity.rs
//
// Account identities for traders, stakers, and the two engine custody accounts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::BasisError;

/// A 32-byte account identity.
///
/// Serialised as a lowercase hex string so it can key JSON maps.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// Derive a deterministic identity from a human-readable label.
    ///
    /// `SHA-256("basis:account:" || label)`. Used for named accounts in the
    /// CLI and simulations, and for the engine custody accounts.
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"basis:account:");
        hasher.update(label.as_bytes());
        let result = hasher.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        Self(output)
    }

    /// Custody account of the pricing engine (token reserve, fees).
    pub fn amm() -> Self {
        Self::from_label("engine:amm")
    }

    /// Custody account of the reward engine (staked tokens, reward pools).
    pub fn staking() -> Self {
        Self::from_label("engine:staking")
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First four bytes in hex, for log lines and tables.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.short())
    }
}

impl FromStr for AccountId {
    type Err = BasisError;

    /// Parses 64 hex characters; anything else is treated as a label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BasisError::InvalidInput("empty account".to_string()));
        }
        if s.len() == 64 {
            if let Ok(bytes) = hex::decode(s) {
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                return Ok(Self(arr));
            }
        }
        Ok(Self::from_label(s))
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(serde::de::Error::custom)?;
        if bytes.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "expected 32-byte account id, got {} bytes",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_is_deterministic() {
        assert_eq!(AccountId::from_label("alice"), AccountId::from_label("alice"));
        assert_ne!(AccountId::from_label("alice"), AccountId::from_label("bob"));
    }

    #[test]
    fn test_custody_accounts_differ() {
        assert_ne!(AccountId::amm(), AccountId::staking());
    }

    #[test]
    fn test_parse_hex_and_label() {
        let alice = AccountId::from_label("alice");
        let parsed: AccountId = alice.to_hex().parse().unwrap();
        assert_eq!(parsed, alice);
        let by_label: AccountId = "alice".parse().unwrap();
        assert_eq!(by_label, alice);
    }

    #[test]
    fn test_serde_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(AccountId::from_label("carol"), 5u64);
        let json = serde_json::to_string(&map).unwrap();
        let back: std::collections::BTreeMap<AccountId, u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}

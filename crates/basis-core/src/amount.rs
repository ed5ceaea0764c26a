// crates/basis-core/src/amount.rs
//
// Amount type, scale constants, and integer fixed-point helpers.
//
// Every product that can exceed 128 bits is formed in a 256-bit intermediate
// and divided exactly once. Division always truncates toward zero unless the
// `_ceil` variant is used explicitly, so the engines never pay out more than
// the exact rational result.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BasisError;

/// Type alias for base units of either currency.
pub type Amount = u128;

/// Number of base units in one whole coin (18 decimals).
pub const UNITS_PER_COIN: Amount = 1_000_000_000_000_000_000;

/// Number of decimal places carried by base units.
pub const DECIMALS: usize = 18;

/// Basis points denominator (10,000 bps = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Q18 scale of the reward-per-unit accumulators.
pub const REWARD_SCALE: u128 = UNITS_PER_COIN;

/// Precision of quoted prices: 2^64 (prices are Q64.64 native per token).
pub const PRICE_PRECISION: u128 = 1 << 64;

/// Whole coins expressed in base units.
///
/// # Panics
/// Panics on overflow; intended for constants and tests.
pub const fn coins(whole: u128) -> Amount {
    whole * UNITS_PER_COIN
}

/// `a * b / denominator`, rounded down, with a 256-bit intermediate.
///
/// # Errors
/// `InvalidInput` if `denominator` is zero, `Arithmetic` if the quotient does
/// not fit in 128 bits.
pub fn mul_div(a: Amount, b: Amount, denominator: Amount) -> Result<Amount, BasisError> {
    mul_div_wide(U256::from(a), U256::from(b), U256::from(denominator))
}

/// `a * b / denominator`, rounded up.
pub fn mul_div_ceil(a: Amount, b: Amount, denominator: Amount) -> Result<Amount, BasisError> {
    if denominator == 0 {
        return Err(BasisError::InvalidInput("division by zero".to_string()));
    }
    let product = U256::from(a) * U256::from(b);
    let d = U256::from(denominator);
    let mut quotient = product / d;
    if !(product % d).is_zero() {
        quotient += U256::one();
    }
    narrow(quotient)
}

/// Floor of `a * b / denominator` where every operand is already 256-bit.
///
/// Used where the denominator itself is a product of two 128-bit values.
pub fn mul_div_wide(a: U256, b: U256, denominator: U256) -> Result<Amount, BasisError> {
    if denominator.is_zero() {
        return Err(BasisError::InvalidInput("division by zero".to_string()));
    }
    let product = a
        .checked_mul(b)
        .ok_or_else(|| BasisError::Arithmetic("256-bit product overflow".to_string()))?;
    narrow(product / denominator)
}

/// Fee of `amount` at `bps` basis points, rounded down.
pub fn bps_of(amount: Amount, bps: u32) -> Result<Amount, BasisError> {
    mul_div(amount, bps as u128, BPS_DENOMINATOR)
}

fn narrow(value: U256) -> Result<Amount, BasisError> {
    if value > U256::from(u128::MAX) {
        return Err(BasisError::Arithmetic(format!(
            "value {} does not fit in 128 bits",
            value
        )));
    }
    Ok(value.low_u128())
}

/// Parse a decimal coin string ("12", "0.5", "1.000000000000000001") into base units.
///
/// # Errors
/// Returns `InvalidInput` for malformed numbers, more than 18 fractional
/// digits, or values that overflow.
pub fn parse_coins(text: &str) -> Result<Amount, BasisError> {
    let text = text.trim();
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(BasisError::InvalidInput("empty amount".to_string()));
    }
    if frac.len() > DECIMALS {
        return Err(BasisError::InvalidInput(format!(
            "amount '{}' has more than {} decimal places",
            text, DECIMALS
        )));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return Err(BasisError::InvalidInput(format!("malformed amount '{}'", text)));
    }

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .map_err(|e| BasisError::InvalidInput(format!("malformed amount '{}': {}", text, e)))?
    };
    let frac_units = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = DECIMALS);
        padded
            .parse::<u128>()
            .map_err(|e| BasisError::InvalidInput(format!("malformed amount '{}': {}", text, e)))?
    };

    whole_units
        .checked_mul(UNITS_PER_COIN)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(|| BasisError::Arithmetic(format!("amount '{}' overflows", text)))
}

/// A base-unit amount displayed as decimal coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coins(pub Amount);

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_COIN;
        let frac = self.0 % UNITS_PER_COIN;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let frac_str = format!("{:018}", frac);
            write!(f, "{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }
}

impl FromStr for Coins {
    type Err = BasisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_coins(s).map(Coins)
    }
}

/// Serde adapter for human-edited files: amounts as decimal coin strings.
///
/// Accepts either a string (`"2.5"`) or a bare integer of whole coins (`100`);
/// always writes a string. TOML integers cannot hold 18-decimal base units.
pub mod serde_coins {
    use super::*;
    use serde::{Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Whole(u64),
    }

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&Coins(*amount).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => parse_coins(&text).map_err(serde::de::Error::custom),
            Repr::Whole(whole) => (whole as u128)
                .checked_mul(UNITS_PER_COIN)
                .ok_or_else(|| serde::de::Error::custom("amount overflows")),
        }
    }
}

/// Marker so `Coins` can travel through serde as a string as well.
impl Serialize for Coins {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_coins::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Coins {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_coins::deserialize(deserializer).map(Coins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_per_coin() {
        assert_eq!(UNITS_PER_COIN, 10u128.pow(18));
        assert_eq!(coins(3), 3 * UNITS_PER_COIN);
    }

    #[test]
    fn test_mul_div_floor() {
        assert_eq!(mul_div(10, 10, 3).unwrap(), 33);
        assert_eq!(mul_div_ceil(10, 10, 3).unwrap(), 34);
        assert_eq!(mul_div_ceil(9, 10, 3).unwrap(), 30);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // u128::MAX * 2 overflows 128 bits but the quotient fits.
        assert_eq!(mul_div(u128::MAX, 2, 2).unwrap(), u128::MAX);
    }

    #[test]
    fn test_mul_div_quotient_overflow() {
        let result = mul_div(u128::MAX, 2, 1);
        assert!(matches!(result, Err(BasisError::Arithmetic(_))));
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert!(matches!(mul_div(1, 1, 0), Err(BasisError::InvalidInput(_))));
    }

    #[test]
    fn test_bps_of_rounds_down() {
        assert_eq!(bps_of(UNITS_PER_COIN, 30).unwrap(), 3_000_000_000_000_000);
        // 0.3% of 333 units is 0.999 units, truncated to zero.
        assert_eq!(bps_of(333, 30).unwrap(), 0);
    }

    #[test]
    fn test_parse_coins() {
        assert_eq!(parse_coins("1").unwrap(), UNITS_PER_COIN);
        assert_eq!(parse_coins("0.5").unwrap(), UNITS_PER_COIN / 2);
        assert_eq!(parse_coins(".25").unwrap(), UNITS_PER_COIN / 4);
        assert_eq!(parse_coins("0.000000000000000001").unwrap(), 1);
        assert!(parse_coins("0.0000000000000000001").is_err());
        assert!(parse_coins("1.2.3").is_err());
        assert!(parse_coins("-1").is_err());
        assert!(parse_coins("").is_err());
    }

    #[test]
    fn test_display_coins() {
        assert_eq!(Coins(coins(42)).to_string(), "42");
        assert_eq!(Coins(1_500_000_000_000_000_000).to_string(), "1.5");
        assert_eq!(Coins(1).to_string(), "0.000000000000000001");
        assert_eq!(Coins(0).to_string(), "0");
    }

    #[test]
    fn test_coins_serde_accepts_string_and_integer() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(with = "serde_coins")]
            amount: Amount,
        }
        let from_str: Holder = serde_json::from_str(r#"{"amount":"2.5"}"#).unwrap();
        assert_eq!(from_str.amount, 2_500_000_000_000_000_000);
        let from_int: Holder = serde_json::from_str(r#"{"amount":7}"#).unwrap();
        assert_eq!(from_int.amount, coins(7));
    }
}

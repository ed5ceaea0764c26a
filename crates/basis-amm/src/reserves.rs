// crates/basis-amm/src/reserves.rs
//
// The Reserve Ledger: a native reserve, a token reserve, and the immutable
// native floor.
//
// The native reserve starts at the floor and is virtual at that level: no
// native coins back the floor itself, only what buyers add above it. Sells
// may draw the reserve down toward the floor but never to or below it.

use serde::{Deserialize, Serialize};

use basis_core::{Amount, BasisError, Guard};

/// Read-only view of the reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    pub native_reserve: Amount,
    pub token_reserve: Amount,
    pub floor_value: Amount,
    /// Native actually held in custody for the reserve (above the floor).
    pub backed_native: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservePair {
    native_reserve: Amount,
    token_reserve: Amount,
    floor_value: Amount,
}

impl ReservePair {
    /// Create the pair at deployment: native reserve at the floor.
    pub fn new(token_reserve: Amount, floor_value: Amount) -> Self {
        Self {
            native_reserve: floor_value,
            token_reserve,
            floor_value,
        }
    }

    pub fn native_reserve(&self) -> Amount {
        self.native_reserve
    }

    pub fn token_reserve(&self) -> Amount {
        self.token_reserve
    }

    pub fn floor_value(&self) -> Amount {
        self.floor_value
    }

    pub fn snapshot(&self) -> ReserveSnapshot {
        ReserveSnapshot {
            native_reserve: self.native_reserve,
            token_reserve: self.token_reserve,
            floor_value: self.floor_value,
            backed_native: self.backed_native(),
        }
    }

    /// Native currency that actually backs the reserve (above the floor).
    pub fn backed_native(&self) -> Amount {
        self.native_reserve - self.floor_value
    }

    /// Whether the pool currently accepts sells at all.
    pub fn sells_open(&self) -> bool {
        self.native_reserve > self.floor_value
    }

    /// Reject a native outflow that would leave the reserve at or below the floor.
    pub fn check_floor(&self, native_out: Amount) -> Result<(), BasisError> {
        if !self.sells_open() {
            return Err(BasisError::GuardViolation(Guard::ReserveFloor));
        }
        match self.native_reserve.checked_sub(native_out) {
            Some(remaining) if remaining > self.floor_value => Ok(()),
            _ => Err(BasisError::GuardViolation(Guard::ReserveFloor)),
        }
    }

    /// Commit a buy: `net_in` native joins the reserve, `token_out` leaves it.
    pub fn apply_buy(&mut self, net_in: Amount, token_out: Amount) -> Result<(), BasisError> {
        if token_out > self.token_reserve {
            return Err(BasisError::InsufficientFunds(format!(
                "token reserve {} cannot cover {}",
                self.token_reserve, token_out
            )));
        }
        let native_reserve = self
            .native_reserve
            .checked_add(net_in)
            .ok_or_else(|| BasisError::Arithmetic("native reserve overflow".to_string()))?;
        self.native_reserve = native_reserve;
        self.token_reserve -= token_out;
        Ok(())
    }

    /// Commit a sell: `native_out` leaves the native reserve.
    ///
    /// Sold tokens are burned rather than returned to the token reserve, so
    /// only the native side moves.
    pub fn apply_sell(&mut self, native_out: Amount) -> Result<(), BasisError> {
        self.check_floor(native_out)?;
        self.native_reserve -= native_out;
        Ok(())
    }
}

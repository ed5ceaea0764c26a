// crates/basis-core/src/traits.rs

use crate::amount::Amount;
use crate::error::BasisError;
use crate::identity::AccountId;
use crate::ledger::Ledger;
use crate::Timestamp;

/// Destination of drained trading fees.
///
/// Implemented by the reward engine (basis-staking). The pricing engine's
/// fee bridge depends only on this capability, never on the concrete engine.
pub trait RewardSink {
    /// Move `amount` tokens from `from` into the token reward pool.
    fn top_up_token_pool(
        &mut self,
        ledger: &mut dyn Ledger,
        from: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError>;

    /// Move `amount` native currency from `from` into the native reward pool.
    fn receive_native_funds(
        &mut self,
        ledger: &mut dyn Ledger,
        from: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError>;
}

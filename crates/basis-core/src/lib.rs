// crates/basis-core/src/lib.rs
//
// basis-core: Shared types for the Basis exchange.
//
// This is the leaf crate that every other crate in the workspace depends on.
// It defines amounts and fixed-point helpers, account identities, the error
// taxonomy, observability events, the ledger collaborator interfaces (plus an
// in-memory ledger), and the capability trait the fee bridge uses to reach
// the reward engine.
//
// All monetary values are tracked in base units.
// 1 coin = 1,000,000,000,000,000,000 base units (10^18), for both currencies.

pub mod amount;
pub mod error;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod traits;

/// Host time in unix seconds. Every time-dependent operation receives it
/// explicitly from the caller (the block time of the enclosing transaction).
pub type Timestamp = u64;

// Re-export key types for ergonomic access from downstream crates.
pub use amount::{
    bps_of, coins, mul_div, mul_div_ceil, Amount, Coins, BPS_DENOMINATOR, PRICE_PRECISION,
    REWARD_SCALE, UNITS_PER_COIN,
};
pub use error::{BasisError, ErrorKind, Guard};
pub use events::{Currency, Direction, MarketEvent};
pub use identity::AccountId;
pub use ledger::{InMemoryLedger, Ledger, LedgerError, NativeLedger, TokenLedger};
pub use traits::RewardSink;

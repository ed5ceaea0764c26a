// crates/basis-staking/src/lib.rs
//
// basis-staking: the Reward Distribution Engine for the Basis exchange.
//
// Stakers lock tokens and earn two independent reward streams, native and
// token, funded by the fee bridge and by direct native deposits. Accrual is
// tracked with two Q18 reward-per-unit accumulators that are brought up to
// date lazily, before any stake, withdrawal, claim, or pool top-up.

pub mod accumulator;
pub mod config;
pub mod engine;
pub mod pools;
pub mod staker;

// Re-export key types for ergonomic access from downstream crates.
pub use accumulator::RewardAccumulator;
pub use config::{RewardConfig, DEFAULT_ACCRUAL_PERIOD_SECS, DEFAULT_CLAIM_COOLDOWN_SECS};
pub use engine::{Claimed, RewardEngine};
pub use pools::RewardPools;
pub use staker::{StakerRecord, StakerTable};

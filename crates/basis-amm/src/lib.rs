// crates/basis-amm/src/lib.rs
//
// basis-amm: the AMM Pricing Engine for the Basis exchange.
//
// Prices native/token trades against a reserve pair with the constant-product
// rule, takes a basis-point fee (native on buys, token on sells), blocks sells
// once the native reserve reaches its protected floor, and bridges the
// accumulated fees into the reward engine.

pub mod config;
pub mod engine;
pub mod fees;
pub mod pricing;
pub mod reserves;

// Re-export key types for ergonomic access from downstream crates.
pub use config::{AmmConfig, DEFAULT_DRAIN_COOLDOWN_SECS, DEFAULT_FEE_BPS};
pub use engine::PricingEngine;
pub use fees::{DrainedFees, FeeAccrual};
pub use pricing::{current_price, swap_output, BuyQuote, SellQuote};
pub use reserves::{ReservePair, ReserveSnapshot};

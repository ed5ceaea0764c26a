// crates/basis-exchange/src/lib.rs
//
// basis-exchange: the composition root of the Basis exchange.
//
// Genesis instantiates one pricing engine and one reward engine over one
// ledger and wires the fee bridge between them. Every public operation runs
// as an all-or-nothing transaction against that state; `SharedExchange`
// serialises writers and rejects re-entry. Snapshots persist the whole state
// as JSON.

pub mod exchange;
pub mod genesis;
pub mod scenario;
pub mod shared;
pub mod snapshot;

// Re-export key types for ergonomic access from downstream crates.
pub use exchange::{Exchange, MarketState, StatusReport};
pub use genesis::GenesisConfig;
pub use scenario::{Operation, Scenario, Step, StepOutcome};
pub use shared::SharedExchange;

// crates/basis-cli/src/commands/mod.rs
//
// Command module declarations and the per-invocation context.

pub mod account;
pub mod init;
pub mod rewards;
pub mod simulate;
pub mod status;
pub mod trade;

use std::path::PathBuf;

use basis_core::{BasisError, Timestamp};
use basis_exchange::{snapshot, Exchange, GenesisConfig, SharedExchange};

use crate::output::OutputFormat;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub state_path: PathBuf,
    pub genesis: GenesisConfig,
    /// Execution time of state-changing operations and time-dependent views.
    pub now: Timestamp,
    pub format: OutputFormat,
}

impl Context {
    /// Load the persisted exchange.
    pub fn open(&self) -> Result<SharedExchange, BasisError> {
        let exchange = snapshot::load(&self.state_path).map_err(|e| match e {
            BasisError::NotFound(_) => BasisError::NotFound(format!(
                "no exchange at {}; run `basis init` first",
                self.state_path.display()
            )),
            other => other,
        })?;
        Ok(SharedExchange::new(exchange))
    }

    /// Run one state-changing operation and persist the result.
    pub fn execute<T, F>(&self, op: F) -> Result<T, BasisError>
    where
        F: FnOnce(&mut Exchange) -> Result<T, BasisError>,
    {
        let handle = self.open()?;
        let value = handle.write(op)?;
        snapshot::save(&handle.snapshot()?, &self.state_path)?;
        Ok(value)
    }

    /// Run a read-only view of the persisted exchange.
    pub fn view<T, F>(&self, view: F) -> Result<T, BasisError>
    where
        F: FnOnce(&Exchange) -> T,
    {
        self.open()?.read(view)
    }
}

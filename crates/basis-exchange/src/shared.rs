// crates/basis-exchange/src/shared.rs
//
// SharedExchange: the single-writer handle over one Exchange.
//
// Cloned into every caller that needs the exchange. Each operation holds the
// lock for its full duration, so no two operations interleave. A call made
// while the same thread already holds the lock (a transfer hook or callback
// calling back in) is rejected with `GuardViolation(Reentrancy)` instead of
// deadlocking.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use basis_core::{BasisError, Guard};

use crate::exchange::Exchange;

#[derive(Clone)]
pub struct SharedExchange {
    inner: Arc<Mutex<Exchange>>,
    /// Thread currently inside an operation, if any.
    owner: Arc<Mutex<Option<ThreadId>>>,
}

/// Clears the owner marker when an operation ends, including by panic.
struct OwnerReset<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
}

impl Drop for OwnerReset<'_> {
    fn drop(&mut self) {
        *lock(self.owner) = None;
    }
}

/// Lock ignoring poison: state is only replaced by a committed transaction,
/// so a panic mid-operation cannot leave it half-written.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SharedExchange {
    pub fn new(exchange: Exchange) -> Self {
        Self {
            inner: Arc::new(Mutex::new(exchange)),
            owner: Arc::new(Mutex::new(None)),
        }
    }

    /// Run a state-mutating operation with exclusive access.
    ///
    /// `op` may issue several exchange calls; they commit together or not at all.
    pub fn write<T, F>(&self, op: F) -> Result<T, BasisError>
    where
        F: FnOnce(&mut Exchange) -> Result<T, BasisError>,
    {
        self.enter()?;
        let mut exchange = lock(&self.inner);
        *lock(&self.owner) = Some(thread::current().id());
        let _reset = OwnerReset { owner: &self.owner };

        let mut working = exchange.clone();
        let value = op(&mut working)?;
        *exchange = working;
        Ok(value)
    }

    /// Run a read-only view.
    pub fn read<T, F>(&self, view: F) -> Result<T, BasisError>
    where
        F: FnOnce(&Exchange) -> T,
    {
        self.enter()?;
        let exchange = lock(&self.inner);
        Ok(view(&exchange))
    }

    /// A copy of the current state, for snapshots.
    pub fn snapshot(&self) -> Result<Exchange, BasisError> {
        self.read(|exchange| exchange.clone())
    }

    fn enter(&self) -> Result<(), BasisError> {
        if *lock(&self.owner) == Some(thread::current().id()) {
            tracing::warn!("Re-entrant exchange call rejected");
            return Err(BasisError::GuardViolation(Guard::Reentrancy));
        }
        Ok(())
    }
}

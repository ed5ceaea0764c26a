// crates/basis-exchange/src/exchange.rs
//
// The deployed exchange: one ledger, one pricing engine, one reward engine.
//
// Each mutating operation runs through `transact`, which works on a copy of
// the market state and replaces the live state only when the operation
// returns `Ok`. A failure at any point, including an outbound transfer after
// local effects were applied, leaves nothing behind. Events buffered by the
// engines reach the event log only on commit.

use serde::{Deserialize, Serialize};

use basis_amm::{BuyQuote, DrainedFees, FeeAccrual, PricingEngine, ReserveSnapshot, SellQuote};
use basis_core::{
    AccountId, Amount, BasisError, Coins, Direction, InMemoryLedger, MarketEvent, NativeLedger,
    RewardSink, Timestamp, TokenLedger,
};
use basis_staking::{Claimed, RewardEngine, RewardPools, StakerRecord};

use crate::genesis::GenesisConfig;

/// Everything a transaction may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    pub ledger: InMemoryLedger,
    pub amm: PricingEngine,
    pub rewards: RewardEngine,
}

impl MarketState {
    fn drain_events(&mut self) -> Vec<MarketEvent> {
        let mut events = self.amm.take_events();
        events.extend(self.rewards.take_events());
        events
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    genesis: GenesisConfig,
    created_at: Timestamp,
    state: MarketState,
    /// Committed events, oldest first.
    #[serde(default)]
    events: Vec<MarketEvent>,
}

/// Summary of the whole exchange for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub reserves: ReserveSnapshot,
    /// Spot price, Q64.64 native per token; `None` once the token reserve is empty.
    pub price_q64: Option<u128>,
    pub fee_in_native: Amount,
    pub fee_in_token: Amount,
    pub next_drain_at: Option<Timestamp>,
    pub native_reward_pool: Amount,
    pub token_reward_pool: Amount,
    pub total_staked: Amount,
    pub stakers: usize,
    pub total_supply: Amount,
    pub native_in_circulation: Amount,
    pub events: usize,
}

impl Exchange {
    /// Deploy a fresh exchange.
    ///
    /// Mints the total supply, gives the dev allocation to the dev account
    /// and the rest to the pricing engine as its token reserve, and points
    /// the fee bridge at the reward engine.
    pub fn genesis(config: GenesisConfig, now: Timestamp) -> Result<Self, BasisError> {
        config.validate()?;
        let dev = config.dev_account_id()?;
        let token_reserve = config.token_reserve();

        let mut amm = PricingEngine::new(config.amm.clone(), token_reserve)?;
        let rewards = RewardEngine::new(config.rewards.clone(), now)?;
        amm.set_reward_destination(rewards.account());

        let mut ledger = InMemoryLedger::new();
        ledger.mint_token(&dev, config.dev_allocation)?;
        ledger.mint_token(&amm.account(), token_reserve)?;

        tracing::info!(
            "Genesis: supply {}, dev allocation {} to {}, token reserve {}, floor {}",
            Coins(config.total_supply),
            Coins(config.dev_allocation),
            dev.short(),
            Coins(token_reserve),
            Coins(config.amm.floor_value)
        );

        Ok(Self {
            genesis: config,
            created_at: now,
            state: MarketState { ledger, amm, rewards },
            events: Vec::new(),
        })
    }

    /// Run `op` against a working copy of the state; keep the result only
    /// if it succeeds.
    pub fn transact<T, F>(&mut self, op: F) -> Result<T, BasisError>
    where
        F: FnOnce(&mut MarketState) -> Result<T, BasisError>,
    {
        let mut working = self.state.clone();
        match op(&mut working) {
            Ok(value) => {
                let events = working.drain_events();
                self.state = working;
                for event in &events {
                    tracing::debug!("Event: {}", event.name());
                }
                self.events.extend(events);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("Transaction rolled back ({}): {}", e.kind(), e);
                Err(e)
            }
        }
    }

    // -- AMM operations ----------------------------------------------------

    pub fn buy(
        &mut self,
        caller: &AccountId,
        native_in: Amount,
        min_token_out: Amount,
        now: Timestamp,
    ) -> Result<BuyQuote, BasisError> {
        self.transact(|s| s.amm.buy(&mut s.ledger, caller, native_in, min_token_out, now))
    }

    pub fn sell(
        &mut self,
        caller: &AccountId,
        token_in: Amount,
        min_native_out: Amount,
        now: Timestamp,
    ) -> Result<SellQuote, BasisError> {
        self.transact(|s| s.amm.sell(&mut s.ledger, caller, token_in, min_native_out, now))
    }

    /// Fee bridge: move accrued fees into the reward pools.
    pub fn drain_fees(&mut self, now: Timestamp) -> Result<DrainedFees, BasisError> {
        self.transact(|s| s.amm.drain_fees(&mut s.ledger, &mut s.rewards, now))
    }

    // -- Staking operations ------------------------------------------------

    pub fn stake(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError> {
        self.transact(|s| s.rewards.stake(&mut s.ledger, caller, amount, now))
    }

    pub fn withdraw(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError> {
        self.transact(|s| s.rewards.withdraw(&mut s.ledger, caller, amount, now))
    }

    pub fn claim(&mut self, caller: &AccountId, now: Timestamp) -> Result<Claimed, BasisError> {
        self.transact(|s| s.rewards.claim(&mut s.ledger, caller, now))
    }

    pub fn settle(&mut self, staker: Option<&AccountId>, now: Timestamp) -> Result<(), BasisError> {
        self.transact(|s| s.rewards.settle(staker, now).map(|_| ()))
    }

    /// Move `amount` of the caller's tokens into the token reward pool.
    pub fn top_up_token_pool(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError> {
        self.transact(|s| s.rewards.top_up_token_pool(&mut s.ledger, caller, amount, now))
    }

    /// Move `amount` of the caller's native currency into the native reward pool.
    pub fn receive_native_funds(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError> {
        self.transact(|s| s.rewards.receive_native_funds(&mut s.ledger, caller, amount, now))
    }

    /// Credit native currency to `account` from outside the system.
    pub fn fund(&mut self, account: &AccountId, amount: Amount) -> Result<(), BasisError> {
        if amount == 0 {
            return Err(BasisError::InvalidInput("fund amount must be nonzero".to_string()));
        }
        self.transact(|s| {
            s.ledger.deposit_native(account, amount)?;
            tracing::info!("Funded {} with {} native", account.short(), Coins(amount));
            Ok(())
        })
    }

    // -- Views -------------------------------------------------------------

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.state.ledger
    }

    pub fn amm(&self) -> &PricingEngine {
        &self.state.amm
    }

    pub fn rewards(&self) -> &RewardEngine {
        &self.state.rewards
    }

    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    pub fn estimate_out(
        &self,
        direction: Direction,
        amount_in: Amount,
    ) -> Result<Amount, BasisError> {
        self.state.amm.estimate_out(direction, amount_in)
    }

    pub fn estimate_in(
        &self,
        direction: Direction,
        amount_out: Amount,
    ) -> Result<Amount, BasisError> {
        self.state.amm.estimate_in(direction, amount_out)
    }

    pub fn current_price(&self) -> Result<u128, BasisError> {
        self.state.amm.current_price()
    }

    pub fn get_reserves(&self) -> ReserveSnapshot {
        self.state.amm.get_reserves()
    }

    pub fn fee_accrual(&self) -> &FeeAccrual {
        self.state.amm.fee_accrual()
    }

    pub fn next_drain_at(&self) -> Option<Timestamp> {
        self.state.amm.next_drain_at()
    }

    pub fn earned_native(&self, staker: &AccountId, now: Timestamp) -> Result<Amount, BasisError> {
        self.state.rewards.earned_native(staker, now)
    }

    pub fn earned_token(&self, staker: &AccountId, now: Timestamp) -> Result<Amount, BasisError> {
        self.state.rewards.earned_token(staker, now)
    }

    pub fn staker(&self, staker: &AccountId) -> Option<&StakerRecord> {
        self.state.rewards.staker(staker)
    }

    pub fn pools(&self) -> RewardPools {
        self.state.rewards.pools()
    }

    pub fn total_staked(&self) -> Amount {
        self.state.rewards.total_staked()
    }

    pub fn next_claim_at(&self, staker: &AccountId) -> Option<Timestamp> {
        self.state.rewards.next_claim_at(staker)
    }

    pub fn native_balance(&self, account: &AccountId) -> Amount {
        self.state.ledger.native_balance(account)
    }

    pub fn token_balance(&self, account: &AccountId) -> Amount {
        self.state.ledger.token_balance(account)
    }

    pub fn status(&self) -> StatusReport {
        let fees = self.fee_accrual();
        let pools = self.pools();
        StatusReport {
            reserves: self.get_reserves(),
            price_q64: self.current_price().ok(),
            fee_in_native: fees.fee_in_native(),
            fee_in_token: fees.fee_in_token(),
            next_drain_at: self.next_drain_at(),
            native_reward_pool: pools.native_reward_pool,
            token_reward_pool: pools.token_reward_pool,
            total_staked: self.total_staked(),
            stakers: self.state.rewards.stakers().len(),
            total_supply: self.state.ledger.total_supply(),
            native_in_circulation: self.state.ledger.native_in_circulation(),
            events: self.events.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis_core::{coins, ErrorKind, UNITS_PER_COIN};

    const T0: Timestamp = 1_700_000_000;

    fn trader() -> AccountId {
        AccountId::from_label("trader")
    }

    fn setup() -> Exchange {
        let mut exchange = Exchange::genesis(GenesisConfig::default(), T0).unwrap();
        exchange.fund(&trader(), coins(1_000)).unwrap();
        exchange
    }

    #[test]
    fn test_genesis_layout() {
        let exchange = Exchange::genesis(GenesisConfig::default(), T0).unwrap();
        let dev = AccountId::from_label("dev");
        assert_eq!(exchange.token_balance(&dev), coins(100_000));
        assert_eq!(exchange.token_balance(&exchange.amm().account()), coins(900_000));
        assert_eq!(exchange.ledger().total_supply(), coins(1_000_000));
        let reserves = exchange.get_reserves();
        assert_eq!(reserves.native_reserve, coins(100));
        assert_eq!(reserves.token_reserve, coins(900_000));
        assert_eq!(exchange.amm().reward_destination(), Some(exchange.rewards().account()));
    }

    #[test]
    fn test_failed_operation_leaves_no_trace() {
        let mut exchange = setup();
        let before = exchange.clone();
        let result = exchange.buy(&trader(), UNITS_PER_COIN, u128::MAX, T0);
        assert_eq!(result.map_err(|e| e.kind()), Err(ErrorKind::SlippageExceeded));
        assert_eq!(exchange, before);
    }

    #[test]
    fn test_events_published_on_commit() {
        let mut exchange = setup();
        exchange.buy(&trader(), UNITS_PER_COIN, 0, T0).unwrap();
        let names: Vec<_> = exchange.events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["trade_executed", "reserves_updated", "fee_accrued"]);
    }

    #[test]
    fn test_transfer_failure_rolls_back_sell() {
        let mut exchange = setup();
        let bought = exchange.buy(&trader(), coins(10), 0, T0).unwrap();
        let before = exchange.clone();

        exchange.transact(|s| {
            s.ledger.set_rejects_native(&trader(), true);
            Ok(())
        })
        .unwrap();
        let result = exchange.sell(&trader(), bought.token_out / 2, 0, T0 + 1);
        assert_eq!(result.map_err(|e| e.kind()), Err(ErrorKind::TransferFailure));
        assert_eq!(exchange.get_reserves(), before.get_reserves());
        assert_eq!(exchange.fee_accrual(), before.fee_accrual());
        assert_eq!(exchange.token_balance(&trader()), bought.token_out);
        assert_eq!(exchange.ledger().total_supply(), before.ledger().total_supply());
    }

    #[test]
    fn test_status_report() {
        let mut exchange = setup();
        exchange.buy(&trader(), coins(1), 0, T0).unwrap();
        let status = exchange.status();
        assert_eq!(status.fee_in_native, 3_000_000_000_000_000);
        assert_eq!(status.total_supply, coins(1_000_000));
        assert!(status.price_q64.is_some());
        assert_eq!(status.reserves.backed_native, 997_000_000_000_000_000);
        assert_eq!(status.native_in_circulation, coins(1_000));
        assert_eq!(status.events, 3);
    }
}

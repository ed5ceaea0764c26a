// crates/basis-amm/src/engine.rs
//
// The AMM Pricing Engine.
//
// Owns the reserve pair and the fee accrual; moves value only through the
// ledger passed into each call. Every operation validates before it mutates,
// commits local state before issuing its outbound transfer, and expects the
// caller to discard the whole engine and ledger state if it returns an error
// (the exchange runs each call inside a transaction).

use serde::{Deserialize, Serialize};

use basis_core::{
    AccountId, Amount, BasisError, Coins, Currency, Direction, Guard, Ledger, MarketEvent,
    NativeLedger, RewardSink, Timestamp, TokenLedger,
};

use crate::config::AmmConfig;
use crate::fees::{DrainedFees, FeeAccrual};
use crate::pricing::{self, BuyQuote, SellQuote};
use crate::reserves::{ReservePair, ReserveSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingEngine {
    config: AmmConfig,
    /// Custody account holding the token reserve, native reserve, and fees.
    account: AccountId,
    reserves: ReservePair,
    fees: FeeAccrual,
    /// Where drained fees go. The fee bridge refuses to run until set.
    reward_destination: Option<AccountId>,
    #[serde(skip)]
    events: Vec<MarketEvent>,
}

impl PricingEngine {
    /// Create the engine with `token_reserve` tokens and the native reserve
    /// at the configured floor.
    ///
    /// The caller is responsible for placing `token_reserve` tokens in the
    /// engine's custody account.
    pub fn new(config: AmmConfig, token_reserve: Amount) -> Result<Self, BasisError> {
        config.validate()?;
        let reserves = ReservePair::new(token_reserve, config.floor_value);
        Ok(Self {
            config,
            account: AccountId::amm(),
            reserves,
            fees: FeeAccrual::new(),
            reward_destination: None,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &AmmConfig {
        &self.config
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn set_reward_destination(&mut self, destination: AccountId) {
        tracing::info!("Fee bridge destination set to {}", destination.short());
        self.reward_destination = Some(destination);
    }

    pub fn reward_destination(&self) -> Option<AccountId> {
        self.reward_destination
    }

    pub fn get_reserves(&self) -> ReserveSnapshot {
        self.reserves.snapshot()
    }

    pub fn fee_accrual(&self) -> &FeeAccrual {
        &self.fees
    }

    pub fn next_drain_at(&self) -> Option<Timestamp> {
        self.fees.next_drain_at(self.config.drain_cooldown_secs)
    }

    /// Spot price of one token in native currency, Q64.64.
    pub fn current_price(&self) -> Result<u128, BasisError> {
        pricing::current_price(&self.reserves)
    }

    /// Output the next trade of `amount_in` would produce at current reserves.
    ///
    /// Buy: native in, tokens out (after the native fee). Sell: tokens in,
    /// native out. Fails exactly when the trade itself would fail for
    /// reserve reasons.
    pub fn estimate_out(
        &self,
        direction: Direction,
        amount_in: Amount,
    ) -> Result<Amount, BasisError> {
        let fee_bps = self.config.fee_bps;
        match direction {
            Direction::Buy => Ok(pricing::quote_buy(&self.reserves, fee_bps, amount_in)?.token_out),
            Direction::Sell => {
                Ok(pricing::quote_sell(&self.reserves, fee_bps, amount_in)?.native_out)
            }
        }
    }

    /// Minimum input for the next trade to produce at least `amount_out`.
    pub fn estimate_in(
        &self,
        direction: Direction,
        amount_out: Amount,
    ) -> Result<Amount, BasisError> {
        match direction {
            Direction::Buy => {
                pricing::buy_input_for(&self.reserves, self.config.fee_bps, amount_out)
            }
            Direction::Sell => pricing::sell_input_for(&self.reserves, amount_out),
        }
    }

    /// Buy tokens with `native_in` native currency paid by `caller`.
    ///
    /// # Errors
    /// - `InvalidInput` for a zero or dust amount.
    /// - `InsufficientFunds` if the caller cannot pay or the token reserve is exhausted.
    /// - `SlippageExceeded` if fewer than `min_token_out` tokens would be delivered.
    pub fn buy(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        native_in: Amount,
        min_token_out: Amount,
        now: Timestamp,
    ) -> Result<BuyQuote, BasisError> {
        let quote = pricing::quote_buy(&self.reserves, self.config.fee_bps, native_in)?;
        if quote.token_out < min_token_out {
            return Err(BasisError::SlippageExceeded {
                minimum: min_token_out,
                actual: quote.token_out,
            });
        }

        // The attached payment arrives with the call.
        ledger.transfer_native(caller, &self.account, native_in)?;

        self.reserves.apply_buy(quote.net_in, quote.token_out)?;
        self.fees.record_native(quote.fee)?;
        self.record_trade(
            caller,
            Direction::Buy,
            native_in,
            quote.token_out,
            quote.fee,
            Currency::Native,
            now,
        );

        ledger.transfer_token(&self.account, caller, quote.token_out)?;

        tracing::info!(
            "Buy by {}: {} native in, {} tokens out, fee {}",
            caller.short(),
            Coins(native_in),
            Coins(quote.token_out),
            Coins(quote.fee)
        );
        Ok(quote)
    }

    /// Sell `token_in` tokens held by `caller` for native currency.
    ///
    /// The fee stays with the engine as a token fee; the rest is burned.
    ///
    /// # Errors
    /// - `InvalidInput` for a zero or dust amount.
    /// - `InsufficientFunds` if the caller holds fewer than `token_in` tokens.
    /// - `GuardViolation(ReserveFloor)` if the native reserve is at the floor
    ///   or the payout would take it there.
    /// - `SlippageExceeded` if less than `min_native_out` would be paid.
    /// - `TransferFailure` if the caller cannot receive native currency.
    pub fn sell(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        token_in: Amount,
        min_native_out: Amount,
        now: Timestamp,
    ) -> Result<SellQuote, BasisError> {
        if token_in == 0 {
            return Err(BasisError::InvalidInput("sell amount must be nonzero".to_string()));
        }
        let held = ledger.token_balance(caller);
        if held < token_in {
            return Err(BasisError::InsufficientFunds(format!(
                "seller holds {} tokens, selling {}",
                Coins(held),
                Coins(token_in)
            )));
        }
        if !self.reserves.sells_open() {
            tracing::warn!("Sell by {} rejected: native reserve at floor", caller.short());
            return Err(BasisError::GuardViolation(Guard::ReserveFloor));
        }

        let quote = pricing::quote_sell(&self.reserves, self.config.fee_bps, token_in)?;
        if quote.native_out < min_native_out {
            return Err(BasisError::SlippageExceeded {
                minimum: min_native_out,
                actual: quote.native_out,
            });
        }

        ledger.transfer_token(caller, &self.account, quote.fee)?;
        ledger.burn_token(caller, quote.burned)?;

        self.reserves.apply_sell(quote.native_out)?;
        self.fees.record_token(quote.fee)?;
        self.record_trade(
            caller,
            Direction::Sell,
            token_in,
            quote.native_out,
            quote.fee,
            Currency::Token,
            now,
        );

        ledger.transfer_native(&self.account, caller, quote.native_out)?;

        tracing::info!(
            "Sell by {}: {} tokens in ({} burned), {} native out, fee {} tokens",
            caller.short(),
            Coins(token_in),
            Coins(quote.burned),
            Coins(quote.native_out),
            Coins(quote.fee)
        );
        Ok(quote)
    }

    /// Fee bridge: move all accrued fees into the reward pools.
    ///
    /// Token fees go through `sink.top_up_token_pool`, native fees through
    /// `sink.receive_native_funds`. Either transfer failing fails the call;
    /// the accrual is only observed as zeroed if the enclosing transaction
    /// commits.
    ///
    /// # Errors
    /// - `GuardViolation(Cooldown)` within `drain_cooldown_secs` of the last drain.
    /// - `GuardViolation(DestinationNotConfigured)` before a destination is set.
    /// - `InvalidInput` when there is nothing to drain.
    pub fn drain_fees(
        &mut self,
        ledger: &mut dyn Ledger,
        sink: &mut dyn RewardSink,
        now: Timestamp,
    ) -> Result<DrainedFees, BasisError> {
        if let Err(e) = self.fees.check_cooldown(now, self.config.drain_cooldown_secs) {
            tracing::warn!("Fee drain rejected: {}", e);
            return Err(e);
        }
        if self.reward_destination.is_none() {
            return Err(BasisError::GuardViolation(Guard::DestinationNotConfigured));
        }
        if self.fees.pending().is_empty() {
            return Err(BasisError::InvalidInput("no fees to drain".to_string()));
        }

        let drained = self.fees.take(now);
        if drained.token > 0 {
            sink.top_up_token_pool(ledger, &self.account, drained.token, now)?;
        }
        if drained.native > 0 {
            sink.receive_native_funds(ledger, &self.account, drained.native, now)?;
        }

        self.events.push(MarketEvent::FeeDrained {
            token_amount: drained.token,
            native_amount: drained.native,
            at: now,
        });
        tracing::info!(
            "Fees drained: {} tokens, {} native",
            Coins(drained.token),
            Coins(drained.native)
        );
        Ok(drained)
    }

    /// Events buffered since the last call.
    pub fn take_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    #[allow(clippy::too_many_arguments)]
    fn record_trade(
        &mut self,
        trader: &AccountId,
        direction: Direction,
        amount_in: Amount,
        amount_out: Amount,
        fee: Amount,
        fee_currency: Currency,
        now: Timestamp,
    ) {
        self.events.push(MarketEvent::TradeExecuted {
            trader: *trader,
            direction,
            amount_in,
            amount_out,
            fee,
            at: now,
        });
        self.events.push(MarketEvent::ReservesUpdated {
            native_reserve: self.reserves.native_reserve(),
            token_reserve: self.reserves.token_reserve(),
        });
        self.events.push(MarketEvent::FeeAccrued {
            currency: fee_currency,
            amount: fee,
        });
    }
}

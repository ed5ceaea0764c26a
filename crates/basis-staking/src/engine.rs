// crates/basis-staking/src/engine.rs
//
// The Reward Distribution Engine.
//
// Stakers lock tokens in the engine's custody account and accrue two reward
// streams. Every mutation runs `settle` first so accumulators and the
// affected staker's accrued rewards are current before any amount changes or
// any payout is computed. Value moves only through the ledger passed in.

use serde::{Deserialize, Serialize};

use basis_core::{
    AccountId, Amount, BasisError, Coins, Currency, Ledger, MarketEvent, NativeLedger, RewardSink,
    Timestamp, TokenLedger,
};

use crate::accumulator::{self, PerUnit, RewardAccumulator};
use crate::config::RewardConfig;
use crate::pools::RewardPools;
use crate::staker::{StakerRecord, StakerTable};

/// Amounts paid out by one claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claimed {
    pub native: Amount,
    pub token: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEngine {
    config: RewardConfig,
    /// Custody account holding staked tokens and both reward pools.
    account: AccountId,
    accumulator: RewardAccumulator,
    pools: RewardPools,
    stakers: StakerTable,
    #[serde(skip)]
    events: Vec<MarketEvent>,
}

impl RewardEngine {
    pub fn new(config: RewardConfig, now: Timestamp) -> Result<Self, BasisError> {
        config.validate()?;
        Ok(Self {
            config,
            account: AccountId::staking(),
            accumulator: RewardAccumulator::new(now),
            pools: RewardPools::default(),
            stakers: StakerTable::new(),
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn accumulator(&self) -> &RewardAccumulator {
        &self.accumulator
    }

    pub fn pools(&self) -> RewardPools {
        self.pools
    }

    pub fn total_staked(&self) -> Amount {
        self.accumulator.total_staked
    }

    pub fn staker(&self, staker: &AccountId) -> Option<&StakerRecord> {
        self.stakers.get(staker)
    }

    pub fn stakers(&self) -> &StakerTable {
        &self.stakers
    }

    /// Earliest time `staker` may claim again; `None` if they never claimed.
    ///
    /// The cooldown must be exceeded, so this is one second past
    /// `last_claim + claim_cooldown_secs`.
    pub fn next_claim_at(&self, staker: &AccountId) -> Option<Timestamp> {
        self.stakers
            .get(staker)
            .and_then(|r| r.last_claim)
            .map(|last| last.saturating_add(self.config.claim_cooldown_secs).saturating_add(1))
    }

    /// Native reward `staker` would receive if settled at `now`.
    pub fn earned_native(&self, staker: &AccountId, now: Timestamp) -> Result<Amount, BasisError> {
        Ok(self.earned(staker, now)?.0)
    }

    /// Token reward `staker` would receive if settled at `now`.
    pub fn earned_token(&self, staker: &AccountId, now: Timestamp) -> Result<Amount, BasisError> {
        Ok(self.earned(staker, now)?.1)
    }

    fn earned(&self, staker: &AccountId, now: Timestamp) -> Result<(Amount, Amount), BasisError> {
        let Some(record) = self.stakers.get(staker) else {
            return Ok((0, 0));
        };
        let per_unit = self
            .accumulator
            .projected(&self.pools, now, self.config.accrual_period_secs)?;
        accumulator::earned(record, per_unit)
    }

    /// Bring the accumulators up to `now` and, if given, fold the staker's
    /// new rewards into their accrued fields.
    ///
    /// Calling this twice at the same instant with unchanged pools changes
    /// nothing the second time.
    pub fn settle(
        &mut self,
        staker: Option<&AccountId>,
        now: Timestamp,
    ) -> Result<PerUnit, BasisError> {
        let per_unit = self
            .accumulator
            .advance(&self.pools, now, self.config.accrual_period_secs)?;

        if let Some(id) = staker {
            if let Some(record) = self.stakers.get_mut(id) {
                let (native, token) = accumulator::earned(record, per_unit)?;
                record.accrued_native_reward = native;
                record.accrued_token_reward = token;
                record.native_reward_per_unit_paid = per_unit.native;
                record.token_reward_per_unit_paid = per_unit.token;
            }
        }

        tracing::debug!(
            "Settled at {}: native/unit {}, token/unit {}",
            now,
            per_unit.native,
            per_unit.token
        );
        self.events.push(MarketEvent::RewardSettled {
            staker: staker.copied(),
            native_reward_per_unit: per_unit.native,
            token_reward_per_unit: per_unit.token,
            at: now,
        });
        Ok(per_unit)
    }

    /// Lock `amount` tokens from `caller`.
    ///
    /// # Errors
    /// - `InvalidInput` for a zero amount.
    /// - `InsufficientFunds` if the caller holds fewer than `amount` tokens.
    pub fn stake(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError> {
        if amount == 0 {
            return Err(BasisError::InvalidInput("stake amount must be nonzero".to_string()));
        }
        let held = ledger.token_balance(caller);
        if held < amount {
            return Err(BasisError::InsufficientFunds(format!(
                "staker holds {} tokens, staking {}",
                Coins(held),
                Coins(amount)
            )));
        }

        let per_unit = self.settle(Some(caller), now)?;
        let total = self
            .accumulator
            .total_staked
            .checked_add(amount)
            .ok_or_else(|| BasisError::Arithmetic("total staked overflow".to_string()))?;

        let record = self.stakers.entry(caller);
        // A fresh record starts from the current accumulator values.
        record.native_reward_per_unit_paid = per_unit.native;
        record.token_reward_per_unit_paid = per_unit.token;
        record.amount = record
            .amount
            .checked_add(amount)
            .ok_or_else(|| BasisError::Arithmetic("stake overflow".to_string()))?;
        let staked = record.amount;
        self.accumulator.total_staked = total;

        self.events.push(MarketEvent::StakeChanged {
            staker: *caller,
            amount: staked,
            total_staked: total,
        });

        ledger.transfer_token(caller, &self.account, amount)?;

        tracing::info!(
            "Stake by {}: +{} (now {}, total {})",
            caller.short(),
            Coins(amount),
            Coins(staked),
            Coins(total)
        );
        Ok(())
    }

    /// Return `amount` staked tokens to `caller`. Accrued rewards stay
    /// claimable.
    ///
    /// # Errors
    /// - `InvalidInput` for a zero amount.
    /// - `InsufficientFunds` if more than the caller's stake is requested.
    pub fn withdraw(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError> {
        if amount == 0 {
            return Err(BasisError::InvalidInput("withdraw amount must be nonzero".to_string()));
        }
        let staked = self.stakers.get(caller).map(|r| r.amount).unwrap_or(0);
        if amount > staked {
            return Err(BasisError::InsufficientFunds(format!(
                "staker has {} staked, withdrawing {}",
                Coins(staked),
                Coins(amount)
            )));
        }

        self.settle(Some(caller), now)?;
        let remaining = staked - amount;
        self.stakers.entry(caller).amount = remaining;
        self.accumulator.total_staked -= amount;
        let total = self.accumulator.total_staked;

        self.events.push(MarketEvent::StakeChanged {
            staker: *caller,
            amount: remaining,
            total_staked: total,
        });

        ledger.transfer_token(&self.account, caller, amount)?;

        tracing::info!(
            "Withdraw by {}: -{} (now {}, total {})",
            caller.short(),
            Coins(amount),
            Coins(remaining),
            Coins(total)
        );
        Ok(())
    }

    /// Pay out everything `caller` has accrued in both currencies.
    ///
    /// Accrued fields are zeroed and pools debited before either transfer.
    ///
    /// # Errors
    /// - `GuardViolation(Cooldown)` until more than `claim_cooldown_secs`
    ///   have passed since the last claim.
    /// - `InvalidInput` when there is nothing to pay.
    /// - `InsufficientFunds` when custody native or the token pool cannot
    ///   cover the payout in full.
    /// - `TransferFailure` if the caller cannot receive native currency.
    pub fn claim(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        now: Timestamp,
    ) -> Result<Claimed, BasisError> {
        if let Some(ready_at) = self.next_claim_at(caller) {
            if now < ready_at {
                tracing::warn!("Claim by {} rejected: cooldown until {}", caller.short(), ready_at);
                return Err(BasisError::cooldown(ready_at));
            }
        }

        self.settle(Some(caller), now)?;
        let (native, token) = match self.stakers.get(caller) {
            Some(r) => (r.accrued_native_reward, r.accrued_token_reward),
            None => (0, 0),
        };
        if native == 0 && token == 0 {
            return Err(BasisError::InvalidInput("nothing to claim".to_string()));
        }

        let native_available = ledger.native_balance(&self.account);
        if native_available < native {
            return Err(BasisError::InsufficientFunds(format!(
                "native rewards {} exceed custody balance {}",
                Coins(native),
                Coins(native_available)
            )));
        }
        if self.pools.token_reward_pool < token {
            return Err(BasisError::InsufficientFunds(format!(
                "token rewards {} exceed token pool {}",
                Coins(token),
                Coins(self.pools.token_reward_pool)
            )));
        }

        let record = self.stakers.entry(caller);
        record.accrued_native_reward = 0;
        record.accrued_token_reward = 0;
        record.last_claim = Some(now);
        self.pools.debit(Currency::Native, native);
        self.pools.debit(Currency::Token, token);

        self.events.push(MarketEvent::RewardPaid {
            staker: *caller,
            native_amount: native,
            token_amount: token,
            at: now,
        });

        if native > 0 {
            ledger.transfer_native(&self.account, caller, native)?;
        }
        if token > 0 {
            ledger.transfer_token(&self.account, caller, token)?;
        }

        tracing::info!(
            "Claim by {}: {} native, {} tokens",
            caller.short(),
            Coins(native),
            Coins(token)
        );
        Ok(Claimed { native, token })
    }

    /// Events buffered since the last call.
    pub fn take_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    fn fund_pool(
        &mut self,
        ledger: &mut dyn Ledger,
        from: &AccountId,
        currency: Currency,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError> {
        if amount == 0 {
            return Err(BasisError::InvalidInput("top-up amount must be nonzero".to_string()));
        }
        // Funds arriving now must not accrue for time already elapsed.
        self.settle(None, now)?;
        self.pools.credit(currency, amount)?;
        match currency {
            Currency::Native => ledger.transfer_native(from, &self.account, amount)?,
            Currency::Token => ledger.transfer_token(from, &self.account, amount)?,
        }
        tracing::info!(
            "{:?} reward pool +{} from {} (pool {})",
            currency,
            Coins(amount),
            from.short(),
            Coins(self.pools.get(currency))
        );
        Ok(())
    }
}

impl RewardSink for RewardEngine {
    fn top_up_token_pool(
        &mut self,
        ledger: &mut dyn Ledger,
        from: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError> {
        self.fund_pool(ledger, from, Currency::Token, amount, now)
    }

    fn receive_native_funds(
        &mut self,
        ledger: &mut dyn Ledger,
        from: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BasisError> {
        self.fund_pool(ledger, from, Currency::Native, amount, now)
    }
}

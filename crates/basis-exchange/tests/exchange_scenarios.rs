// crates/basis-exchange/tests/exchange_scenarios.rs
//
// End-to-end scenarios over a deployed exchange: exact trade and reward
// figures, the reserve floor, the fee bridge into the reward pools, claim
// cooldowns, and rollback of failed transfers.

use basis_core::{coins, AccountId, BasisError, Direction, ErrorKind, Guard, UNITS_PER_COIN};
use basis_exchange::{snapshot, Exchange, GenesisConfig, SharedExchange};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const T0: u64 = 1_700_000_000;
const HOUR: u64 = 3_600;
const DAY: u64 = 86_400;

fn alice() -> AccountId {
    AccountId::from_label("alice")
}

fn bob() -> AccountId {
    AccountId::from_label("bob")
}

fn dev() -> AccountId {
    AccountId::from_label("dev")
}

/// Default genesis (native 100, token 900,000) with alice and bob funded.
fn deploy() -> Exchange {
    let mut exchange = Exchange::genesis(GenesisConfig::default(), T0).unwrap();
    exchange.fund(&alice(), coins(10_000)).unwrap();
    exchange.fund(&bob(), coins(10_000)).unwrap();
    exchange
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[test]
fn buy_of_one_native_matches_formula_exactly() {
    let mut exchange = deploy();
    let quote = exchange.buy(&alice(), UNITS_PER_COIN, 0, T0).unwrap();

    // floor(0.997 * 900000 / (100 + 0.997)) in base units.
    assert_eq!(quote.token_out, 8_884_422_309_573_551_689_654);
    assert_eq!(quote.net_in, 997_000_000_000_000_000);
    let reserves = exchange.get_reserves();
    assert_eq!(reserves.token_reserve, coins(900_000) - 8_884_422_309_573_551_689_654);
    assert_eq!(reserves.native_reserve, 100_997_000_000_000_000_000);
}

#[test]
fn estimates_agree_with_the_next_trade() {
    let mut exchange = deploy();
    let estimate = exchange.estimate_out(Direction::Buy, coins(3)).unwrap();
    let quote = exchange.buy(&alice(), coins(3), estimate, T0).unwrap();
    assert_eq!(quote.token_out, estimate);

    let sell_amount = quote.token_out / 4;
    let estimate = exchange.estimate_out(Direction::Sell, sell_amount).unwrap();
    let quote = exchange.sell(&alice(), sell_amount, estimate, T0 + 1).unwrap();
    assert_eq!(quote.native_out, estimate);
}

#[test]
fn sell_through_floor_rejected_regardless_of_bound() {
    let mut exchange = deploy();

    // At genesis the native reserve sits exactly on the floor.
    let result = exchange.sell(&dev(), coins(1), 0, T0);
    assert_eq!(result, Err(BasisError::GuardViolation(Guard::ReserveFloor)));

    // One native of buying backs 0.997 native; dumping the dev allocation
    // would pay out far more than that.
    exchange.buy(&alice(), UNITS_PER_COIN, 0, T0).unwrap();
    let before = exchange.clone();
    let result = exchange.sell(&dev(), coins(100_000), 0, T0 + 1);
    assert_eq!(result, Err(BasisError::GuardViolation(Guard::ReserveFloor)));
    assert_eq!(exchange, before);
}

#[test]
fn slippage_bound_rejects_without_effects() {
    let mut exchange = deploy();
    let before = exchange.clone();
    let result = exchange.buy(&alice(), coins(1), 8_884_422_309_573_551_689_655, T0);
    assert_eq!(
        result,
        Err(BasisError::SlippageExceeded {
            minimum: 8_884_422_309_573_551_689_655,
            actual: 8_884_422_309_573_551_689_654,
        })
    );
    assert_eq!(exchange, before);
}

#[test]
fn trades_below_price_resolution_rejected() {
    let mut exchange = deploy();

    // One base unit would buy 8,999 tokens without moving the Q64.64 price.
    let before = exchange.clone();
    let result = exchange.buy(&alice(), 1, 0, T0);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(exchange, before);

    // 1e8 token units would pay out 13,437 native units, also invisible.
    exchange.buy(&alice(), coins(10), 0, T0).unwrap();
    let price = exchange.current_price().unwrap();
    let result = exchange.sell(&alice(), 100_000_000, 0, T0 + 1);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(exchange.current_price().unwrap(), price);

    // A hundred times more moves it.
    let quote = exchange.sell(&alice(), 10_000_000_000, 0, T0 + 2).unwrap();
    assert!(quote.native_out > 0);
    assert!(exchange.current_price().unwrap() < price);
}

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

#[test]
fn one_hour_with_one_native_in_pool() {
    let mut exchange = deploy();
    exchange.stake(&dev(), coins(100), T0).unwrap();
    exchange.receive_native_funds(&bob(), UNITS_PER_COIN, T0).unwrap();

    // 1e18 * 3600 * 1e18 / (100e18 * 3600) = 1e16 per unit; 100e18 * 1e16 / 1e18.
    assert_eq!(exchange.earned_native(&dev(), T0 + HOUR).unwrap(), 1_000_000_000_000_000_000);
    assert_eq!(exchange.earned_token(&dev(), T0 + HOUR).unwrap(), 0);
}

#[test]
fn equal_stakes_over_equal_windows_earn_equally() {
    let mut exchange = deploy();
    exchange.buy(&alice(), coins(50), 0, T0).unwrap();
    exchange.buy(&bob(), coins(50), 0, T0).unwrap();
    exchange.stake(&alice(), coins(1_000), T0 + 10).unwrap();
    exchange.stake(&bob(), coins(1_000), T0 + 10).unwrap();
    exchange.receive_native_funds(&alice(), coins(2), T0 + 20).unwrap();
    exchange.top_up_token_pool(&bob(), coins(40), T0 + 20).unwrap();

    let at = T0 + 20 + 777;
    assert_eq!(
        exchange.earned_native(&alice(), at).unwrap(),
        exchange.earned_native(&bob(), at).unwrap()
    );
    assert_eq!(
        exchange.earned_token(&alice(), at).unwrap(),
        exchange.earned_token(&bob(), at).unwrap()
    );
}

#[test]
fn settle_twice_at_same_instant_changes_nothing() {
    let mut exchange = deploy();
    exchange.stake(&dev(), coins(10), T0).unwrap();
    exchange.receive_native_funds(&bob(), coins(1), T0).unwrap();
    exchange.settle(Some(&dev()), T0 + 99).unwrap();
    let accumulator = exchange.rewards().accumulator().clone();
    let record = exchange.staker(&dev()).cloned();

    exchange.settle(Some(&dev()), T0 + 99).unwrap();
    exchange.settle(None, T0 + 99).unwrap();
    assert_eq!(exchange.rewards().accumulator(), &accumulator);
    assert_eq!(exchange.staker(&dev()).cloned(), record);
}

#[test]
fn second_claim_inside_cooldown_rejected() {
    let mut exchange = deploy();
    exchange.stake(&dev(), coins(100), T0).unwrap();
    exchange.receive_native_funds(&bob(), coins(1), T0).unwrap();

    let first = exchange.claim(&dev(), T0 + HOUR).unwrap();
    assert_eq!(first.native, coins(1));
    assert_eq!(exchange.native_balance(&dev()), coins(1));

    exchange.receive_native_funds(&bob(), coins(1), T0 + HOUR + 1).unwrap();
    let second = exchange.claim(&dev(), T0 + HOUR + 1);
    assert_eq!(second, Err(BasisError::cooldown(T0 + 2 * HOUR + 1)));

    // Exactly one cooldown later has not exceeded it.
    let boundary = exchange.claim(&dev(), T0 + 2 * HOUR);
    assert_eq!(boundary, Err(BasisError::cooldown(T0 + 2 * HOUR + 1)));

    let third = exchange.claim(&dev(), T0 + 2 * HOUR + 1).unwrap();
    assert_eq!(third.native, coins(1));
}

#[test]
fn claim_is_all_or_nothing_when_pool_short() {
    let mut exchange = deploy();
    exchange.stake(&dev(), coins(100), T0).unwrap();
    exchange.receive_native_funds(&bob(), coins(1), T0).unwrap();

    // Two hours at the full-pool rate promises twice what custody holds.
    let before = exchange.clone();
    let result = exchange.claim(&dev(), T0 + 2 * HOUR);
    assert_eq!(result.map_err(|e| e.kind()), Err(ErrorKind::InsufficientFunds));
    assert_eq!(exchange, before);
}

#[test]
fn claim_rolls_back_when_payout_transfer_fails() {
    let mut exchange = deploy();
    exchange.stake(&dev(), coins(100), T0).unwrap();
    exchange.receive_native_funds(&bob(), coins(1), T0).unwrap();
    exchange
        .transact(|s| {
            s.ledger.set_rejects_native(&dev(), true);
            Ok(())
        })
        .unwrap();

    let before = exchange.clone();
    let pools = exchange.pools();
    let record = exchange.staker(&dev()).cloned();
    let result = exchange.claim(&dev(), T0 + HOUR);
    assert_eq!(result.map_err(|e| e.kind()), Err(ErrorKind::TransferFailure));

    // Accrued rewards, pools, and the claim clock are untouched.
    assert_eq!(exchange, before);
    assert_eq!(exchange.pools(), pools);
    assert_eq!(exchange.staker(&dev()).cloned(), record);
    assert_eq!(exchange.staker(&dev()).unwrap().last_claim, None);
    assert_eq!(exchange.next_claim_at(&dev()), None);
    assert_eq!(exchange.earned_native(&dev(), T0 + HOUR).unwrap(), coins(1));
    assert_eq!(exchange.events().len(), before.events().len());
}

// ---------------------------------------------------------------------------
// Fee bridge
// ---------------------------------------------------------------------------

#[test]
fn drained_fees_fund_both_reward_streams() {
    let mut exchange = deploy();
    exchange.stake(&dev(), coins(1_000), T0).unwrap();
    let bought = exchange.buy(&alice(), coins(10), 0, T0).unwrap();
    let sold = exchange.sell(&alice(), bought.token_out / 2, 0, T0 + 1).unwrap();

    let drained = exchange.drain_fees(T0 + 2).unwrap();
    assert_eq!(drained.native, bought.fee);
    assert_eq!(drained.token, sold.fee);
    let pools = exchange.pools();
    assert_eq!(pools.native_reward_pool, bought.fee);
    assert_eq!(pools.token_reward_pool, sold.fee);
    assert_eq!(exchange.fee_accrual().fee_in_native(), 0);
    assert_eq!(exchange.fee_accrual().fee_in_token(), 0);
    assert_eq!(exchange.next_drain_at(), Some(T0 + 2 + DAY));

    let native_before = exchange.native_balance(&dev());
    let tokens_before = exchange.token_balance(&dev());
    let claimed = exchange.claim(&dev(), T0 + 2 + HOUR / 2).unwrap();
    assert!(claimed.native > 0 && claimed.token > 0);
    assert_eq!(exchange.native_balance(&dev()), native_before + claimed.native);
    assert_eq!(exchange.token_balance(&dev()), tokens_before + claimed.token);
}

#[test]
fn drain_cooldown_enforced() {
    let mut exchange = deploy();
    exchange.buy(&alice(), coins(1), 0, T0).unwrap();
    exchange.drain_fees(T0).unwrap();
    exchange.buy(&alice(), coins(1), 0, T0 + 1).unwrap();

    assert_eq!(exchange.drain_fees(T0 + DAY - 1), Err(BasisError::cooldown(T0 + DAY)));
    assert!(exchange.drain_fees(T0 + DAY).is_ok());
}

#[test]
fn failed_bridge_transfer_keeps_fees_accrued() {
    let mut exchange = deploy();
    exchange.buy(&alice(), coins(1), 0, T0).unwrap();
    let staking = exchange.rewards().account();
    exchange
        .transact(|s| {
            s.ledger.set_rejects_native(&staking, true);
            Ok(())
        })
        .unwrap();

    let result = exchange.drain_fees(T0);
    assert_eq!(result.map_err(|e| e.kind()), Err(ErrorKind::TransferFailure));
    assert_eq!(exchange.fee_accrual().fee_in_native(), 3_000_000_000_000_000);
    assert_eq!(exchange.fee_accrual().last_drain(), None);
    assert_eq!(exchange.pools().native_reward_pool, 0);
}

// ---------------------------------------------------------------------------
// Handle and persistence
// ---------------------------------------------------------------------------

#[test]
fn shared_handle_persists_through_snapshot() {
    let handle = SharedExchange::new(deploy());
    handle.write(|ex| ex.buy(&alice(), coins(5), 0, T0)).unwrap();
    handle
        .write(|ex| {
            ex.stake(&dev(), coins(10), T0 + 1)?;
            ex.receive_native_funds(&bob(), coins(1), T0 + 1)
        })
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("basis.json");
    snapshot::save(&handle.snapshot().unwrap(), &path).unwrap();

    let restored = snapshot::load(&path).unwrap();
    assert_eq!(restored.total_staked(), coins(10));
    assert_eq!(
        restored.earned_native(&dev(), T0 + 1 + HOUR).unwrap(),
        coins(1)
    );
    assert_eq!(restored.events(), handle.read(|ex| ex.events().to_vec()).unwrap().as_slice());
}

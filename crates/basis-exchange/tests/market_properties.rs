// crates/basis-exchange/tests/market_properties.rs
//
// Property tests over random trade sequences: native conservation, custody
// backing, and monotonic pricing.

use proptest::prelude::*;

use basis_core::{coins, AccountId, Amount};
use basis_exchange::{Exchange, GenesisConfig};

const T0: u64 = 1_700_000_000;

#[derive(Debug, Clone)]
enum Trade {
    /// Native in, base units.
    Buy(Amount),
    /// Percentage of the trader's tokens to sell.
    Sell(u8),
}

fn trade() -> impl Strategy<Value = Trade> {
    prop_oneof![
        (1_000_000_000_000u128..=coins(1_000)).prop_map(Trade::Buy),
        (1u8..=100).prop_map(Trade::Sell),
    ]
}

fn trader() -> AccountId {
    AccountId::from_label("trader")
}

fn deploy() -> Exchange {
    let mut exchange = Exchange::genesis(GenesisConfig::default(), T0).unwrap();
    exchange.fund(&trader(), coins(1_000_000)).unwrap();
    exchange
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn native_is_conserved(trades in prop::collection::vec(trade(), 1..40)) {
        let mut exchange = deploy();
        let floor = exchange.get_reserves().floor_value;
        let mut native_in: Amount = 0;
        let mut native_out: Amount = 0;

        for (i, t) in trades.iter().enumerate() {
            let now = T0 + i as u64;
            match t {
                Trade::Buy(amount) => {
                    if let Ok(quote) = exchange.buy(&trader(), *amount, 0, now) {
                        native_in += quote.native_in;
                    }
                }
                Trade::Sell(pct) => {
                    let held = exchange.token_balance(&trader());
                    let amount = held * (*pct as u128) / 100;
                    if let Ok(quote) = exchange.sell(&trader(), amount, 0, now) {
                        native_out += quote.native_out;
                    }
                }
            }

            let reserves = exchange.get_reserves();
            let fees = exchange.fee_accrual().fee_in_native();
            prop_assert_eq!(reserves.native_reserve + fees + native_out, native_in + floor);
            prop_assert!(reserves.native_reserve >= floor);

            // The floor is virtual: custody holds exactly the backed reserve plus fees.
            let custody = exchange.native_balance(&exchange.amm().account());
            prop_assert_eq!(custody, reserves.backed_native + fees);
        }
    }

    #[test]
    fn buys_raise_and_sells_lower_the_price(trades in prop::collection::vec(trade(), 1..40)) {
        let mut exchange = deploy();
        for (i, t) in trades.iter().enumerate() {
            let now = T0 + i as u64;
            let before = exchange.current_price().unwrap();
            match t {
                Trade::Buy(amount) => {
                    if exchange.buy(&trader(), *amount, 0, now).is_ok() {
                        prop_assert!(exchange.current_price().unwrap() > before);
                    }
                }
                Trade::Sell(pct) => {
                    let held = exchange.token_balance(&trader());
                    let amount = held * (*pct as u128) / 100;
                    if exchange.sell(&trader(), amount, 0, now).is_ok() {
                        prop_assert!(exchange.current_price().unwrap() < before);
                    }
                }
            }
        }
    }
}

//! Property-based tests for acbledger-core.
//!
//! These tests verify the algebra of average-cost accounting holds for
//! arbitrary inputs using proptest: exact accumulation over buys,
//! proportional disposal on sells, and lossless flat-file round-trips.

use acbledger_core::{acb, Ledger, Security, Transaction, TxnKind};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_quantity() -> impl Strategy<Value = Decimal> {
    // Positive, up to 4 decimal places.
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

fn arb_price() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_fee() -> impl Strategy<Value = Decimal> {
    (0i64..10_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_symbol() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("BTC".to_string()),
        Just("ETH".to_string()),
        Just("AAPL".to_string()),
        Just("VTI".to_string()),
        Just("XEQT".to_string()),
    ]
}

fn arb_description() -> impl Strategy<Value = String> {
    // The flat format cannot escape its delimiter, so descriptions never
    // contain commas.
    "[A-Za-z0-9 ]{0,20}".prop_map(|s| s.trim().to_string())
}

/// The i-th transaction of a history gets the i-th day of 2020, so
/// generated histories are already in sort order and ties never occur.
fn nth_date(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Days::new(i as u64)
}

fn arb_buys(max: usize) -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec((arb_quantity(), arb_price(), arb_fee()), 1..max).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (qty, price, fee))| {
                Transaction::new(nth_date(i), TxnKind::Buy, qty, price, fee).unwrap()
            })
            .collect()
    })
}

/// A history where every sell is covered by the units held at that point:
/// raw (is_sell, qty, price, fee) specs are repaired so a sell never asks
/// for more than is held and never hits an empty position.
fn arb_consistent_history(max: usize) -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(
        (any::<bool>(), arb_quantity(), arb_price(), arb_fee()),
        1..max,
    )
    .prop_map(|specs| {
        let mut held = Decimal::ZERO;
        let mut txns = Vec::with_capacity(specs.len());
        for (i, (is_sell, qty, price, fee)) in specs.into_iter().enumerate() {
            let date = nth_date(i);
            if is_sell && held > qty {
                held -= qty;
                txns.push(Transaction::new(date, TxnKind::Sell, qty, price, fee).unwrap());
            } else {
                held += qty;
                txns.push(Transaction::new(date, TxnKind::Buy, qty, price, fee).unwrap());
            }
        }
        txns
    })
}

fn arb_security() -> impl Strategy<Value = Security> {
    (arb_symbol(), arb_description(), arb_consistent_history(12)).prop_map(
        |(symbol, description, txns)| {
            let mut sec = Security::new(symbol, description);
            for txn in txns {
                sec.push(txn);
            }
            sec
        },
    )
}

// ============================================================================
// ACB engine properties
// ============================================================================

proptest! {
    /// Buys accumulate exactly: no rounding drift over any number of
    /// transactions.
    #[test]
    fn buys_sum_exactly(txns in arb_buys(24)) {
        let report = acb::compute(&txns).unwrap();

        let expected_cost: Decimal = txns.iter().map(|t| t.quantity * t.price + t.fee).sum();
        let expected_qty: Decimal = txns.iter().map(|t| t.quantity).sum();

        prop_assert_eq!(report.remaining_cost_base, expected_cost);
        prop_assert_eq!(report.remaining_quantity, expected_qty);
        prop_assert!(report.warnings().next().is_none());
    }

    /// Buying then selling the full position at the same price with no
    /// fees realizes exactly zero gain.
    #[test]
    fn full_round_trip_at_cost_is_flat(qty in arb_quantity(), price in arb_price()) {
        let buy = Transaction::new(nth_date(0), TxnKind::Buy, qty, price, Decimal::ZERO).unwrap();
        let sell = Transaction::new(nth_date(1), TxnKind::Sell, qty, price, Decimal::ZERO).unwrap();

        let report = acb::compute(&[buy, sell]).unwrap();
        prop_assert_eq!(report.rows[1].gain_loss, Some(Decimal::ZERO));
        prop_assert_eq!(report.remaining_quantity, Decimal::ZERO);
        prop_assert_eq!(report.remaining_cost_base, Decimal::ZERO);
    }

    /// Every sell disposes of exactly the proportional share of the cost
    /// base held before it, and the remainder is exactly what is left.
    #[test]
    fn sells_dispose_proportionally(txns in arb_consistent_history(16)) {
        let report = acb::compute(&txns).unwrap();

        let mut quantity = Decimal::ZERO;
        let mut cost_base = Decimal::ZERO;
        for row in &report.rows {
            match row.txn.kind {
                TxnKind::Buy => {
                    quantity += row.txn.quantity;
                    cost_base += row.txn.quantity * row.txn.price + row.txn.fee;
                }
                TxnKind::Sell => {
                    let disposed = cost_base * row.txn.quantity / quantity;
                    prop_assert_eq!(row.disposed_cost, Some(disposed));
                    prop_assert_eq!(
                        row.gain_loss,
                        Some(row.txn.quantity * row.txn.price - disposed - row.txn.fee)
                    );
                    quantity -= row.txn.quantity;
                    cost_base -= disposed;
                }
            }
        }
        prop_assert_eq!(report.remaining_quantity, quantity);
        prop_assert_eq!(report.remaining_cost_base, cost_base);
    }

    /// Overselling a non-empty position warns but still returns a report.
    #[test]
    fn oversell_warns_without_aborting(
        held in arb_quantity(),
        extra in arb_quantity(),
        price in arb_price(),
    ) {
        let buy = Transaction::new(nth_date(0), TxnKind::Buy, held, price, Decimal::ZERO).unwrap();
        let sell = Transaction::new(
            nth_date(1),
            TxnKind::Sell,
            held + extra,
            price,
            Decimal::ZERO,
        )
        .unwrap();

        let report = acb::compute(&[buy, sell]).unwrap();
        prop_assert_eq!(report.warnings().count(), 1);
        prop_assert!(report.rows[1].gain_loss.is_some());
        prop_assert_eq!(report.remaining_quantity, -extra);
    }
}

// ============================================================================
// Flat-file round-trip properties
// ============================================================================

proptest! {
    /// serialize → parse is the identity on securities, including ones
    /// with no transactions.
    #[test]
    fn security_line_round_trips(sec in arb_security()) {
        let parsed = Security::parse_line(&sec.serialize_line()).unwrap();
        prop_assert_eq!(parsed, sec);
    }

    /// serialize → parse is the identity on whole ledgers.
    #[test]
    fn ledger_round_trips(secs in prop::collection::vec(arb_security(), 0..4)) {
        let mut ledger = Ledger::new();
        for sec in secs {
            if ledger.contains(sec.symbol()) {
                continue;
            }
            ledger.add_security(sec.symbol(), sec.description()).unwrap();
            for txn in sec.transactions() {
                ledger.add_transaction(sec.symbol(), txn.clone()).unwrap();
            }
        }

        let parsed = Ledger::parse(&ledger.serialize()).unwrap();
        prop_assert_eq!(parsed, ledger);
    }
}

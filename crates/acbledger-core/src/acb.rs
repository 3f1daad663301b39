//! The adjusted-cost-base engine.
//!
//! Replays a security's transactions in `(date, kind)` order, carrying a
//! running quantity and running cost base, and computes for each sell the
//! proportional cost base disposed of and the realized gain or loss:
//!
//! ```text
//! buy:  quantity += q;  cost_base += q * price + fee
//! sell: disposed  = cost_base * q / quantity
//!       gain      = q * price - disposed - fee
//!       quantity -= q;  cost_base -= disposed
//! ```
//!
//! All arithmetic is exact decimal; only report rendering rounds.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

use crate::transaction::{format_date, Transaction, TxnKind};

/// Error that aborts a replay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcbError {
    /// A sell with nothing held at all: the disposed cost base would
    /// divide by a zero running quantity.
    #[error(
        "cannot compute ACB for a sell of {quantity} units on {on}: no units held",
        on = format_date(*.date)
    )]
    SellFromEmpty {
        /// Date of the offending sell.
        date: NaiveDate,
        /// Units the sell asked for.
        quantity: Decimal,
    },
}

/// Non-fatal inconsistency noticed during a replay.
///
/// An oversell signals a probably-incomplete transaction history; the
/// computation proceeds with whatever running totals exist, which may go
/// negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcbWarning {
    /// A sell for more units than are currently held.
    Oversell {
        /// Date of the sell.
        date: NaiveDate,
        /// Units the sell asked for.
        requested: Decimal,
        /// Units actually held before the sell.
        available: Decimal,
    },
}

impl fmt::Display for AcbWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oversell {
                date,
                requested,
                available,
            } => write!(
                f,
                "sell transaction occurred for {requested} units on {} when only {available} units available",
                format_date(*date)
            ),
        }
    }
}

/// One transaction's slice of the report.
///
/// `disposed_cost` and `gain_loss` are `Some` only for sells and carry
/// full precision; rendering rounds them to two decimal places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcbRow {
    /// The transaction this row reports on.
    pub txn: Transaction,
    /// Cost base removed from the books by this sell.
    pub disposed_cost: Option<Decimal>,
    /// Realized gain (positive) or loss (negative) on this sell.
    pub gain_loss: Option<Decimal>,
    /// Oversell noticed at this row, if any.
    pub warning: Option<AcbWarning>,
}

/// The full result of replaying one security's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcbReport {
    /// One row per transaction, in replay order.
    pub rows: Vec<AcbRow>,
    /// Units still held after the last transaction.
    pub remaining_quantity: Decimal,
    /// Cost base of the units still held, unrounded.
    pub remaining_cost_base: Decimal,
}

impl AcbReport {
    /// All warnings raised during the replay, in row order.
    pub fn warnings(&self) -> impl Iterator<Item = &AcbWarning> {
        self.rows.iter().filter_map(|row| row.warning.as_ref())
    }
}

/// Replay `transactions` and build the report.
///
/// The caller supplies the transactions already sorted by the composite
/// `(date, kind)` key, as
/// [`Security::sorted_transactions`](crate::Security::sorted_transactions)
/// returns them.
///
/// # Examples
///
/// ```
/// use acbledger_core::{acb, Transaction, TxnKind};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let date = |m| NaiveDate::from_ymd_opt(2020, m, 1).unwrap();
/// let txns = vec![
///     Transaction::new(date(1), TxnKind::Buy, dec!(10), dec!(100), dec!(5)).unwrap(),
///     Transaction::new(date(2), TxnKind::Buy, dec!(10), dec!(120), dec!(5)).unwrap(),
///     Transaction::new(date(3), TxnKind::Sell, dec!(10), dec!(150), dec!(5)).unwrap(),
/// ];
///
/// let report = acb::compute(&txns).unwrap();
/// assert_eq!(report.rows[2].disposed_cost, Some(dec!(1105)));
/// assert_eq!(report.rows[2].gain_loss, Some(dec!(390)));
/// assert_eq!(report.remaining_quantity, dec!(10));
/// assert_eq!(report.remaining_cost_base, dec!(1105));
/// ```
pub fn compute(transactions: &[Transaction]) -> Result<AcbReport, AcbError> {
    let mut quantity = Decimal::ZERO;
    let mut cost_base = Decimal::ZERO;
    let mut rows = Vec::with_capacity(transactions.len());

    for txn in transactions {
        match txn.kind {
            TxnKind::Buy => {
                quantity += txn.quantity;
                cost_base += txn.quantity * txn.price + txn.fee;
                rows.push(AcbRow {
                    txn: txn.clone(),
                    disposed_cost: None,
                    gain_loss: None,
                    warning: None,
                });
            }
            TxnKind::Sell => {
                let warning = (quantity < txn.quantity).then(|| AcbWarning::Oversell {
                    date: txn.date,
                    requested: txn.quantity,
                    available: quantity,
                });
                let disposed = (cost_base * txn.quantity).checked_div(quantity).ok_or(
                    AcbError::SellFromEmpty {
                        date: txn.date,
                        quantity: txn.quantity,
                    },
                )?;
                let gain_loss = txn.quantity * txn.price - disposed - txn.fee;
                quantity -= txn.quantity;
                cost_base -= disposed;
                rows.push(AcbRow {
                    txn: txn.clone(),
                    disposed_cost: Some(disposed),
                    gain_loss: Some(gain_loss),
                    warning,
                });
            }
        }
    }

    Ok(AcbReport {
        rows,
        remaining_quantity: quantity,
        remaining_cost_base: cost_base,
    })
}

//! Core types for acbledger
//!
//! This crate provides the data model and the computation engine behind
//! the acbledger command-line tool:
//!
//! - [`Transaction`] - One buy or sell event, with its flat-file codec
//! - [`Security`] - A symbol, description, and owned transaction history
//! - [`Ledger`] - Every security in the book, with load/save persistence
//! - [`acb`] - The adjusted-cost-base engine: replays a history and
//!   computes disposed cost base and realized gain/loss per sell
//!
//! All monetary and quantity arithmetic uses [`rust_decimal::Decimal`];
//! binary floating point never touches the books.
//!
//! # Example
//!
//! ```
//! use acbledger_core::{acb, Ledger, Transaction, TxnKind};
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let mut ledger = Ledger::new();
//! ledger.add_security("btc", "Bitcoin").unwrap();
//!
//! let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let buy = Transaction::new(date, TxnKind::Buy, dec!(10), dec!(100), dec!(5)).unwrap();
//! ledger.add_transaction("BTC", buy).unwrap();
//!
//! let security = ledger.get("BTC").unwrap();
//! let report = acb::compute(&security.sorted_transactions()).unwrap();
//! assert_eq!(report.remaining_quantity, dec!(10));
//! assert_eq!(report.remaining_cost_base, dec!(1005));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod acb;
pub mod amount;
pub mod ledger;
pub mod security;
pub mod transaction;

pub use acb::{AcbError, AcbReport, AcbRow, AcbWarning};
pub use amount::fmt_money;
pub use ledger::{Ledger, LedgerError};
pub use security::Security;
pub use transaction::{
    format_date, parse_date, ParseError, Transaction, TxnKind, DATE_FORMAT, TXN_FIELDS,
};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;

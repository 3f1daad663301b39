//! Transaction type and its flat-file codec.
//!
//! A [`Transaction`] is one buy or sell event for one security. Transactions
//! are immutable once constructed and are owned exclusively by their
//! [`Security`](crate::Security).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::amount::parse_decimal;

/// Number of flat-file fields per transaction: date, type, quantity,
/// price, fee. The deserializer requires trailing fields on a security
/// line to come in groups of exactly this many.
pub const TXN_FIELDS: usize = 5;

/// Date format used in the flat file and in reports.
pub const DATE_FORMAT: &str = "%m-%d-%Y";

/// Formats accepted when parsing a date from user or file input.
///
/// Input is permissive; output always round-trips through [`DATE_FORMAT`].
const DATE_INPUT_FORMATS: &[&str] = &[
    "%m-%d-%Y", "%m/%d/%Y", "%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y",
];

/// Error parsing or validating a transaction or security line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Date string matched none of the accepted formats.
    #[error("could not parse date {0:?}")]
    InvalidDate(String),
    /// Transaction type other than the literal `buy` or `sell`.
    #[error("invalid transaction type {0:?} (expected \"buy\" or \"sell\")")]
    InvalidKind(String),
    /// A numeric field that is not an exact decimal.
    #[error("invalid number {value:?} for {field}")]
    InvalidNumber {
        /// Which field failed to parse.
        field: &'static str,
        /// The offending input.
        value: String,
    },
    /// Quantity must be strictly positive.
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),
    /// Price and fee must be non-negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount {
        /// Which field was negative.
        field: &'static str,
        /// The offending value.
        value: Decimal,
    },
    /// A security line whose field count cannot hold whole transactions.
    #[error(
        "line splits into {found} fields; expected symbol, description, \
         then transactions in groups of {TXN_FIELDS}"
    )]
    FieldCount {
        /// Number of fields found on the line.
        found: usize,
    },
}

/// Whether a transaction acquires or disposes of units.
///
/// `Buy` is declared before `Sell` so the derived ordering equals
/// lexicographic order of the lowercase labels. That is the tie-break for
/// same-date transactions, and it affects computed gain/loss, so it must
/// not change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TxnKind {
    /// Acquire units, increasing the cost base.
    Buy,
    /// Dispose of units, realizing a gain or loss.
    Sell,
}

impl TxnKind {
    /// The lowercase label used in the flat file and in prompts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl FromStr for TxnKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            _ => Err(ParseError::InvalidKind(s.to_string())),
        }
    }
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One buy or sell event for one security.
///
/// # Examples
///
/// ```
/// use acbledger_core::{Transaction, TxnKind};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let txn = Transaction::new(
///     NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///     TxnKind::Buy,
///     dec!(10),
///     dec!(100),
///     dec!(5),
/// )
/// .unwrap();
/// assert_eq!(txn.date_str(), "01-01-2020");
/// assert_eq!(txn.serialize_fields(), "01-01-2020,buy,10,100,5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Calendar date of the event.
    pub date: NaiveDate,
    /// Buy or sell.
    pub kind: TxnKind,
    /// Units traded; strictly positive.
    pub quantity: Decimal,
    /// Price per unit; non-negative.
    pub price: Decimal,
    /// Commission or fee; non-negative.
    pub fee: Decimal,
}

impl Transaction {
    /// Create a transaction, validating the numeric invariants.
    pub fn new(
        date: NaiveDate,
        kind: TxnKind,
        quantity: Decimal,
        price: Decimal,
        fee: Decimal,
    ) -> Result<Self, ParseError> {
        if quantity.is_sign_negative() || quantity.is_zero() {
            return Err(ParseError::InvalidQuantity(quantity));
        }
        if price.is_sign_negative() {
            return Err(ParseError::NegativeAmount {
                field: "price",
                value: price,
            });
        }
        if fee.is_sign_negative() {
            return Err(ParseError::NegativeAmount {
                field: "fee",
                value: fee,
            });
        }
        Ok(Self {
            date,
            kind,
            quantity,
            price,
            fee,
        })
    }

    /// Composite ordering key: date ascending, then kind.
    ///
    /// Same-date ties break on the kind label (buys before sells), which
    /// changes which cost base a sell disposes of.
    #[must_use]
    pub const fn sort_key(&self) -> (NaiveDate, TxnKind) {
        (self.date, self.kind)
    }

    /// The date rendered as `MM-DD-YYYY`.
    #[must_use]
    pub fn date_str(&self) -> String {
        format_date(self.date)
    }

    /// Render the five flat-file fields, comma-separated.
    #[must_use]
    pub fn serialize_fields(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.date_str(),
            self.kind,
            self.quantity,
            self.price,
            self.fee
        )
    }

    /// Parse one transaction from exactly [`TXN_FIELDS`] flat-file fields.
    pub fn from_fields(fields: &[&str]) -> Result<Self, ParseError> {
        debug_assert_eq!(fields.len(), TXN_FIELDS);
        let date = parse_date(fields[0])?;
        let kind = fields[1].parse()?;
        let quantity = parse_field(fields[2], "quantity")?;
        let price = parse_field(fields[3], "price")?;
        let fee = parse_field(fields[4], "fee")?;
        Self::new(date, kind, quantity, price, fee)
    }
}

fn parse_field(s: &str, field: &'static str) -> Result<Decimal, ParseError> {
    parse_decimal(s).ok_or_else(|| ParseError::InvalidNumber {
        field,
        value: s.to_string(),
    })
}

/// Render a date as `MM-DD-YYYY`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a date permissively, trying each accepted format in turn.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    let s = s.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .ok_or_else(|| ParseError::InvalidDate(s.to_string()))
}

//! Security type: a symbol, a description, and its owned transactions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::transaction::{ParseError, Transaction, TXN_FIELDS};

/// A tradable instrument identified by a unique symbol, holding its
/// transaction history.
///
/// Transactions are stored in insertion order; the ACB engine and all
/// rendering work from [`sorted_transactions`](Self::sorted_transactions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    symbol: String,
    description: String,
    transactions: Vec<Transaction>,
}

impl Security {
    /// Create an empty security. Callers normalize the symbol to
    /// uppercase before construction (the ledger does this at entry).
    #[must_use]
    pub fn new(symbol: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            description: description.into(),
            transactions: Vec::new(),
        }
    }

    /// The security's symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The optional free-text description (empty string when absent).
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Transactions in insertion order.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Append a transaction.
    pub fn push(&mut self, txn: Transaction) {
        self.transactions.push(txn);
    }

    /// Transactions sorted by the composite `(date, kind)` key.
    #[must_use]
    pub fn sorted_transactions(&self) -> Vec<Transaction> {
        let mut txns = self.transactions.clone();
        txns.sort_by_key(Transaction::sort_key);
        txns
    }

    /// Render this security as one flat-file line.
    ///
    /// A security with no transactions renders as exactly three fields:
    /// symbol, description, and a trailing empty field.
    #[must_use]
    pub fn serialize_line(&self) -> String {
        let txns: Vec<String> = self
            .sorted_transactions()
            .iter()
            .map(Transaction::serialize_fields)
            .collect();
        format!("{},{},{}", self.symbol, self.description, txns.join(","))
    }

    /// Parse one flat-file line back into a security.
    ///
    /// The line must split into at least three fields, with any trailing
    /// transaction fields in groups of [`TXN_FIELDS`]; anything else is a
    /// [`ParseError::FieldCount`] contract violation.
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 3 {
            return Err(ParseError::FieldCount {
                found: fields.len(),
            });
        }

        let mut security = Self::new(fields[0], fields[1]);
        if fields.len() == 3 && fields[2].is_empty() {
            // Empty trailing field; no transactions.
            return Ok(security);
        }

        let txn_fields = &fields[2..];
        if txn_fields.len() % TXN_FIELDS != 0 {
            return Err(ParseError::FieldCount {
                found: fields.len(),
            });
        }
        for chunk in txn_fields.chunks(TXN_FIELDS) {
            security.push(Transaction::from_fields(chunk)?);
        }
        Ok(security)
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.symbol)
        } else {
            write!(f, "{} - {}", self.symbol, self.description)
        }
    }
}

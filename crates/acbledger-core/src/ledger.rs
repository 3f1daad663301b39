//! The ledger: every security in the book, keyed by symbol, plus
//! flat-file persistence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::security::Security;
use crate::transaction::{ParseError, Transaction};

/// Error from a ledger operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A security with this symbol already exists.
    #[error("{0} already exists")]
    DuplicateSymbol(String),
    /// No security with this symbol; create it first.
    #[error("{0} does not exist")]
    UnknownSymbol(String),
    /// A persisted line failed the format contract.
    #[error("line {line}: {source}")]
    Parse {
        /// 1-based line number in the loaded text.
        line: usize,
        /// The underlying format error.
        #[source]
        source: ParseError,
    },
    /// Reading or writing the ledger file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// All securities, keyed by uppercase symbol.
///
/// Constructed once at startup and passed into command handlers; loading
/// a file replaces the whole ledger, never merges. A `BTreeMap` keeps
/// iteration in symbol order, which is the order every listing wants.
///
/// # Examples
///
/// ```
/// use acbledger_core::Ledger;
///
/// let mut ledger = Ledger::new();
/// ledger.add_security("btc", "Bitcoin").unwrap();
/// assert!(ledger.contains("BTC"));
/// assert!(ledger.add_security("BTC", "again").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    securities: BTreeMap<String, Security>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no securities have been entered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    /// Number of securities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.securities.len()
    }

    /// True when a security with this symbol exists (case-insensitive).
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.securities.contains_key(&symbol.to_uppercase())
    }

    /// Look up a security by symbol (case-insensitive).
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&Security> {
        self.securities.get(&symbol.to_uppercase())
    }

    /// All symbols, in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.securities.keys().map(String::as_str)
    }

    /// All securities, in symbol order.
    pub fn securities(&self) -> impl Iterator<Item = &Security> {
        self.securities.values()
    }

    /// Create a new security. The symbol is normalized to uppercase.
    pub fn add_security(
        &mut self,
        symbol: &str,
        description: &str,
    ) -> Result<(), LedgerError> {
        let key = symbol.to_uppercase();
        if self.securities.contains_key(&key) {
            return Err(LedgerError::DuplicateSymbol(key));
        }
        let security = Security::new(key.clone(), description);
        self.securities.insert(key, security);
        Ok(())
    }

    /// Append a transaction to an existing security.
    pub fn add_transaction(
        &mut self,
        symbol: &str,
        txn: Transaction,
    ) -> Result<(), LedgerError> {
        let key = symbol.to_uppercase();
        self.securities
            .get_mut(&key)
            .ok_or(LedgerError::UnknownSymbol(key))?
            .push(txn);
        Ok(())
    }

    /// Render the whole ledger: one line per security, newline-separated.
    #[must_use]
    pub fn serialize(&self) -> String {
        let lines: Vec<String> = self
            .securities
            .values()
            .map(Security::serialize_line)
            .collect();
        lines.join("\n")
    }

    /// Parse a whole ledger from flat text, line by line.
    ///
    /// The result replaces any previous ledger wholesale; a format error
    /// on any line aborts the load.
    pub fn parse(text: &str) -> Result<Self, LedgerError> {
        let mut ledger = Self::new();
        for (i, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let security = Security::parse_line(line)
                .map_err(|source| LedgerError::Parse { line: i + 1, source })?;
            ledger
                .securities
                .insert(security.symbol().to_string(), security);
        }
        Ok(ledger)
    }

    /// Load a ledger from a file, replacing the in-memory state.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Write the whole ledger to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LedgerError> {
        std::fs::write(path, self.serialize())?;
        Ok(())
    }
}

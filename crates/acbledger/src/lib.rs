//! Interactive adjusted-cost-base (ACB) ledger.
//!
//! This crate provides the `acbledger` command-line tool: an interactive
//! shell for recording buy/sell transactions of securities and computing
//! the adjusted cost base and realized gain/loss of each sell, using the
//! average-cost method.
//!
//! # Example Usage
//!
//! ```bash
//! acbledger                 # start with an empty ledger
//! acbledger portfolio.txt   # preload a saved ledger
//! ```
//!
//! The computation itself lives in [`acbledger_core`]; this crate is the
//! shell ([`cmd::shell`]) and the plain-text rendering ([`report`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod report;

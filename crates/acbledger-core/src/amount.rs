//! Decimal parsing and display helpers.
//!
//! All monetary and quantity arithmetic in this crate uses [`Decimal`]
//! (exact fixed-point), never binary floating point. Cumulative rounding
//! error across a long transaction history would silently corrupt cost
//! bases, so exactness is a correctness requirement, not a nicety.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a decimal from user or file input.
///
/// Returns `None` for anything [`Decimal`] cannot represent exactly
/// (including scientific notation, which the flat-file format forbids).
#[must_use]
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}

/// Parse a strictly positive decimal (quantities).
#[must_use]
pub fn parse_positive(s: &str) -> Option<Decimal> {
    parse_decimal(s).filter(|d| d.is_sign_positive() && !d.is_zero())
}

/// Parse a non-negative decimal (prices and fees).
#[must_use]
pub fn parse_non_negative(s: &str) -> Option<Decimal> {
    parse_decimal(s).filter(|d| !d.is_sign_negative())
}

/// Render a value rounded to two decimal places for display.
///
/// Only the rendering is rounded; running totals are carried at full
/// precision everywhere.
#[must_use]
pub fn fmt_money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

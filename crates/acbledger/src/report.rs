//! Plain-text rendering of securities, listings, and ACB reports.
//!
//! Everything writes to a generic `W: Write` so the shell can render to
//! stdout and tests can render to a buffer.

use acbledger_core::{fmt_money, AcbReport, Ledger, Security, Transaction, TxnKind};
use std::io::{self, Write};

/// Column header matching the transaction row layout.
#[must_use]
pub fn txn_header() -> String {
    format!(
        "mm-dd-yyyy\t{:>4}\t{:>8}\t{:>8}\t{:>8}",
        "type", "quantity", "price", "fee"
    )
}

/// One tab-separated transaction row.
#[must_use]
pub fn txn_row(txn: &Transaction) -> String {
    format!(
        "{}\t{:>4}\t{:>8}\t{:>8}\t{:>8}",
        txn.date_str(),
        txn.kind.label(),
        txn.quantity.to_string(),
        txn.price.to_string(),
        txn.fee.to_string()
    )
}

/// Write one security with its transactions in key order.
pub fn write_security<W: Write>(w: &mut W, security: &Security) -> io::Result<()> {
    writeln!(w, "{security}")?;
    if security.transactions().is_empty() {
        return Ok(());
    }
    writeln!(w, "{}", txn_header())?;
    for txn in security.sorted_transactions() {
        writeln!(w, "{}", txn_row(&txn))?;
    }
    Ok(())
}

/// Write every security in the ledger, in symbol order.
pub fn write_listing<W: Write>(w: &mut W, ledger: &Ledger) -> io::Result<()> {
    for security in ledger.securities() {
        write_security(w, security)?;
    }
    Ok(())
}

/// Write a full ACB report: header, one row per transaction (sells carry
/// disposed cost base and gain/loss at two decimal places, with any
/// oversell warning on the line before), then the unrounded totals.
pub fn write_acb<W: Write>(w: &mut W, report: &AcbReport) -> io::Result<()> {
    writeln!(w, "{}\t{:>8}\t{:>8}", txn_header(), "ACB", "gain/loss")?;
    for row in &report.rows {
        if let Some(warning) = &row.warning {
            writeln!(w, "Warning: {warning}.")?;
        }
        match (row.txn.kind, row.disposed_cost, row.gain_loss) {
            (TxnKind::Sell, Some(disposed), Some(gain)) => writeln!(
                w,
                "{}\t{:>8}\t{:>8}",
                txn_row(&row.txn),
                fmt_money(disposed),
                fmt_money(gain)
            )?,
            _ => writeln!(w, "{}", txn_row(&row.txn))?,
        }
    }
    writeln!(w, "Remaining quantity: {}", report.remaining_quantity)?;
    writeln!(w, "Remaining ACB: {}", report.remaining_cost_base)?;
    Ok(())
}

//! Spreadsheet (CSV) export: one row per counted item.

use std::io::Write;

use anyhow::Context;
use chrono::NaiveDate;

use scantally_ledger::StockItem;

/// Export file name for a given day, e.g. `stock_count_2026-08-27.csv`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("stock_count_{}.csv", date.format("%Y-%m-%d"))
}

/// Write the item list as CSV: barcode, quantity, human-readable last scan.
///
/// A pure one-shot transform over the full list; no runtime state.
pub fn write_csv<W: Write>(items: &[StockItem], writer: W) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Barcode", "Quantity", "Last Scanned"])
        .context("failed to write CSV header")?;

    for item in items {
        let quantity = item.quantity.to_string();
        let scanned = item.last_scanned_at.format("%Y-%m-%d %H:%M:%S").to_string();
        csv.write_record([item.barcode.as_str(), quantity.as_str(), scanned.as_str()])
            .with_context(|| format!("failed to write CSV row for {}", item.barcode))?;
    }

    csv.flush().context("failed to flush CSV output")?;
    Ok(())
}

//! CSV export of the per-day cost ledger.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::engine::daily_cost::DailyCost;

/// Column header of the daily ledger CSV.
const HEADER: &str = "date,energy_cost_base,energy_cost_intermediate,energy_cost_peak,\
                       water_cost,gas_cost,distribution_share,capacity_share,total_cost";

/// Exports a daily cost ledger to a CSV file at the given path.
///
/// Writes a header row followed by one row per day. Identical ledgers
/// produce identical files.
///
/// # Arguments
///
/// * `ledger` - Daily cost records of one month
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_daily_ledger(ledger: &[DailyCost], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_daily_ledger(ledger, buf)
}

/// Writes a daily cost ledger as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_daily_ledger(ledger: &[DailyCost], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for c in ledger {
        wtr.write_record(&[
            c.date.to_string(),
            format!("{:.4}", c.energy_cost_base),
            format!("{:.4}", c.energy_cost_intermediate),
            format!("{:.4}", c.energy_cost_peak),
            format!("{:.4}", c.water_cost),
            format!("{:.4}", c.gas_cost),
            format!("{:.4}", c.distribution_share),
            format!("{:.4}", c.capacity_share),
            format!("{:.4}", c.total_cost),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

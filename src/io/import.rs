//! CSV ingest of readings, pricing and tank snapshots.
//!
//! Headers follow the record field names. Empty cells in nullable columns
//! load as null.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::readings::{DailyReading, GasTankSnapshot, MonthlyPricing, PricingError, PricingTable, YearMonth};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("row {row}: invalid period {year}-{month}")]
    InvalidPeriod { row: usize, year: i32, month: u32 },
    #[error("row {row}, column {column}: cannot parse \"{value}\"")]
    Field {
        row: usize,
        column: usize,
        value: String,
    },
}

fn open(path: &Path) -> Result<File, ImportError> {
    File::open(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn deserialize_all<T: DeserializeOwned>(reader: impl Read) -> Result<Vec<T>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        out.push(record?);
    }
    Ok(out)
}

/// Reads daily readings, returned in date order.
///
/// # Errors
///
/// Returns an `ImportError` if a row does not match the reading layout.
pub fn read_readings(reader: impl Read) -> Result<Vec<DailyReading>, ImportError> {
    let mut readings: Vec<DailyReading> = deserialize_all(reader)?;
    readings.sort_by_key(|r| r.date);
    Ok(readings)
}

/// Reads daily readings from a file.
///
/// # Errors
///
/// Returns an `ImportError` if the file cannot be opened or parsed.
pub fn read_readings_path(path: &Path) -> Result<Vec<DailyReading>, ImportError> {
    read_readings(open(path)?)
}

/// Reads pricing records into a lookup table.
///
/// # Errors
///
/// Returns an `ImportError` on malformed rows or a repeated month.
pub fn read_pricing(reader: impl Read) -> Result<PricingTable, ImportError> {
    let records: Vec<MonthlyPricing> = deserialize_all(reader)?;
    Ok(PricingTable::from_records(records)?)
}

/// Reads pricing records from a file.
///
/// # Errors
///
/// Returns an `ImportError` if the file cannot be opened or parsed.
pub fn read_pricing_path(path: &Path) -> Result<PricingTable, ImportError> {
    read_pricing(open(path)?)
}

/// Reads tank snapshots laid out as `year,month,tank_01,...,tank_14`.
///
/// An empty tank cell loads as 0%.
///
/// # Errors
///
/// Returns an `ImportError` on a short row, an unparsable cell or an
/// impossible month.
pub fn read_tank_snapshots(reader: impl Read) -> Result<Vec<GasTankSnapshot>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut out = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let year: i32 = parse_cell(&record, row, 0)?;
        let month: u32 = parse_cell(&record, row, 1)?;
        let period =
            YearMonth::new(year, month).ok_or(ImportError::InvalidPeriod { row, year, month })?;

        let mut levels = [0.0; GasTankSnapshot::TANKS];
        for (t, level) in levels.iter_mut().enumerate() {
            let column = t + 2;
            if !cell(&record, row, column)?.is_empty() {
                *level = parse_cell(&record, row, column)?;
            }
        }
        out.push(GasTankSnapshot::new(period, levels));
    }
    Ok(out)
}

fn cell(record: &csv::StringRecord, row: usize, column: usize) -> Result<&str, ImportError> {
    record.get(column).ok_or_else(|| ImportError::Field {
        row,
        column,
        value: String::new(),
    })
}

fn parse_cell<T: std::str::FromStr>(
    record: &csv::StringRecord,
    row: usize,
    column: usize,
) -> Result<T, ImportError> {
    let raw = cell(record, row, column)?;
    raw.parse().map_err(|_| ImportError::Field {
        row,
        column,
        value: raw.to_string(),
    })
}

/// Reads tank snapshots from a file.
///
/// # Errors
///
/// Returns an `ImportError` if the file cannot be opened or parsed.
pub fn read_tank_snapshots_path(path: &Path) -> Result<Vec<GasTankSnapshot>, ImportError> {
    read_tank_snapshots(open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const READINGS: &str = "\
date,electricity_base,electricity_intermediate,electricity_peak,water_municipal,water_witness_meter,water_desalinated,reactive_power,demand_base,demand_intermediate,demand_peak,gas_consumption,occupancy_guests,occupied_rooms,exchange_rate
2024-01-02,1010,500,200,40,,12,300,0.4,0.5,0.6,350,180,95,17.1
2024-01-01,1000,495,198,35,,10,297,0.4,0.5,0.6,340,170,90,
";

    #[test]
    fn readings_load_sorted_with_nulls() {
        let readings = read_readings(READINGS.as_bytes()).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(readings[0].electricity_base, Some(1000.0));
        assert_eq!(readings[0].water_witness_meter, None);
        assert_eq!(readings[0].exchange_rate, None);
        assert_eq!(readings[1].occupied_rooms, Some(95));
        assert_eq!(readings[1].gas_consumption, 350.0);
    }

    #[test]
    fn pricing_loads_into_table() {
        let csv = "\
year,month,fixed_cost,energy_price_base,energy_price_intermediate,energy_price_peak,distribution_price,capacity_price,gas_price,water_price
2024,1,1200,1.0,1.6,2.0,110,360,11.5,45
2024,2,1200,1.0,1.6,2.0,110,360,11.7,45
";
        let table = read_pricing(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        let feb = table.get(YearMonth::new(2024, 2).unwrap()).unwrap();
        assert_eq!(feb.gas_price, 11.7);
    }

    #[test]
    fn duplicate_pricing_month_is_rejected() {
        let csv = "\
year,month,fixed_cost,energy_price_base,energy_price_intermediate,energy_price_peak,distribution_price,capacity_price,gas_price,water_price
2024,1,1,1,1,1,1,1,1,1
2024,1,2,2,2,2,2,2,2,2
";
        assert!(matches!(
            read_pricing(csv.as_bytes()),
            Err(ImportError::Pricing(PricingError::Duplicate(_)))
        ));
    }

    #[test]
    fn tank_snapshots_load() {
        let csv = "\
year,month,tank_01,tank_02,tank_03,tank_04,tank_05,tank_06,tank_07,tank_08,tank_09,tank_10,tank_11,tank_12,tank_13,tank_14
2024,1,50,50,50,50,50,50,50,50,50,50,50,50,50,
";
        let snaps = read_tank_snapshots(csv.as_bytes()).unwrap();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].levels_pct[0], 50.0);
        assert_eq!(snaps[0].levels_pct[13], 0.0);
    }

    #[test]
    fn tank_snapshot_with_bad_month_is_rejected() {
        let csv = "\
year,month,tank_01,tank_02,tank_03,tank_04,tank_05,tank_06,tank_07,tank_08,tank_09,tank_10,tank_11,tank_12,tank_13,tank_14
2024,13,1,1,1,1,1,1,1,1,1,1,1,1,1,1
";
        assert!(matches!(
            read_tank_snapshots(csv.as_bytes()),
            Err(ImportError::InvalidPeriod { row: 1, .. })
        ));
    }

    #[test]
    fn tank_snapshot_with_text_level_is_rejected() {
        let csv = "\
year,month,tank_01,tank_02,tank_03,tank_04,tank_05,tank_06,tank_07,tank_08,tank_09,tank_10,tank_11,tank_12,tank_13,tank_14
2024,1,full,1,1,1,1,1,1,1,1,1,1,1,1,1
";
        assert!(matches!(
            read_tank_snapshots(csv.as_bytes()),
            Err(ImportError::Field { column: 2, .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_readings_path(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}

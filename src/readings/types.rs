//! Input records supplied by the data-retrieval side: daily meter readings,
//! monthly unit prices and gas-tank snapshots.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A calendar month, the unit every forecast is keyed by.
///
/// # Examples
///
/// ```
/// use hotel_utility_forecast::readings::YearMonth;
///
/// let feb = YearMonth::new(2024, 2).unwrap();
/// assert_eq!(feb.days_in_month(), 29);
/// assert_eq!(feb.next(), YearMonth::new(2024, 3).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month a date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(s: &str) -> Option<Self> {
        let (y, m) = s.trim().split_once('-')?;
        Self::new(y.parse().ok()?, m.parse().ok()?)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year.saturating_add(1),
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Number of calendar days in the month.
    pub fn days_in_month(&self) -> u32 {
        let next = self.next().first_day();
        (next - self.first_day()).num_days() as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One day's meter log for the property.
///
/// Electricity, water and reactive fields are cumulative counters; demand
/// fields are the instantaneous peak of the day; `gas_consumption` is the
/// day's own volume, already resolved upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReading {
    pub date: NaiveDate,
    pub electricity_base: Option<f64>,
    pub electricity_intermediate: Option<f64>,
    pub electricity_peak: Option<f64>,
    pub water_municipal: Option<f64>,
    pub water_witness_meter: Option<f64>,
    pub water_desalinated: Option<f64>,
    pub reactive_power: Option<f64>,
    pub demand_base: Option<f64>,
    pub demand_intermediate: Option<f64>,
    pub demand_peak: Option<f64>,
    #[serde(default)]
    pub gas_consumption: f64,
    pub occupancy_guests: Option<u32>,
    pub occupied_rooms: Option<u32>,
    pub exchange_rate: Option<f64>,
}

impl DailyReading {
    /// A reading for `date` with every meter null and no gas logged.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }
}

/// Unit prices in force for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPricing {
    pub year: i32,
    pub month: u32,
    pub fixed_cost: f64,
    pub energy_price_base: f64,
    pub energy_price_intermediate: f64,
    pub energy_price_peak: f64,
    pub distribution_price: f64,
    pub capacity_price: f64,
    pub gas_price: f64,
    pub water_price: f64,
}

impl MonthlyPricing {
    /// Returns `None` if the record carries an impossible month number.
    pub fn period(&self) -> Option<YearMonth> {
        YearMonth::new(self.year, self.month)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("duplicate pricing record for {0}")]
    Duplicate(YearMonth),
    #[error("pricing record has invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Pricing lookup keyed by month; at most one record per month.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    by_month: BTreeMap<YearMonth, MonthlyPricing>,
}

impl PricingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table, rejecting repeated months.
    ///
    /// # Errors
    ///
    /// Returns a `PricingError` on the first duplicate or malformed month.
    pub fn from_records(
        records: impl IntoIterator<Item = MonthlyPricing>,
    ) -> Result<Self, PricingError> {
        let mut table = Self::new();
        for record in records {
            table.insert(record)?;
        }
        Ok(table)
    }

    /// Adds a record.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Duplicate` if the month is already priced.
    pub fn insert(&mut self, record: MonthlyPricing) -> Result<(), PricingError> {
        let period = record.period().ok_or(PricingError::InvalidMonth {
            year: record.year,
            month: record.month,
        })?;
        if self.by_month.contains_key(&period) {
            return Err(PricingError::Duplicate(period));
        }
        self.by_month.insert(period, record);
        Ok(())
    }

    pub fn get(&self, period: YearMonth) -> Option<&MonthlyPricing> {
        self.by_month.get(&period)
    }

    pub fn len(&self) -> usize {
        self.by_month.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_month.is_empty()
    }
}

/// Fill levels of the property's gas tanks at one point in a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasTankSnapshot {
    pub year: i32,
    pub month: u32,
    /// Fill percentage (0-100) per tank.
    pub levels_pct: [f64; GasTankSnapshot::TANKS],
}

impl GasTankSnapshot {
    /// Number of tanks installed at the property.
    pub const TANKS: usize = 14;

    pub fn new(period: YearMonth, levels_pct: [f64; Self::TANKS]) -> Self {
        Self {
            year: period.year,
            month: period.month,
            levels_pct,
        }
    }

    /// All tanks at the same level.
    pub fn uniform(period: YearMonth, pct: f64) -> Self {
        Self::new(period, [pct; Self::TANKS])
    }

    pub fn period(&self) -> Option<YearMonth> {
        YearMonth::new(self.year, self.month)
    }
}

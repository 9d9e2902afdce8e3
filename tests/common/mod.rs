//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use hotel_utility_forecast::readings::{
    DailyReading, GasTankSnapshot, MonthlyPricing, PricingTable, YearMonth,
};

/// January 2024 (31 days).
pub fn january() -> YearMonth {
    YearMonth { year: 2024, month: 1 }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Unit prices with every energy tier at 1.0, demand charges at 100/200,
/// fixed 1000, gas 2.0 and water 5.0.
pub fn pricing(period: YearMonth) -> MonthlyPricing {
    MonthlyPricing {
        year: period.year,
        month: period.month,
        fixed_cost: 1_000.0,
        energy_price_base: 1.0,
        energy_price_intermediate: 1.0,
        energy_price_peak: 1.0,
        distribution_price: 100.0,
        capacity_price: 200.0,
        gas_price: 2.0,
        water_price: 5.0,
    }
}

/// Pricing table holding one record per given month.
pub fn pricing_table(periods: &[YearMonth]) -> PricingTable {
    PricingTable::from_records(periods.iter().map(|&p| pricing(p)))
        .expect("fixture months are distinct")
}

/// A steady, unbroken reading run of `days` days starting on the 1st of
/// `period`. Runs longer than the month continue into the following months.
///
/// Each day advances base by 2, intermediate by 1, peak by 0.5 and reactive
/// by 1 meter unit; municipal water by 30 m³ and desalinated by 10 m³. Peak
/// demand reads 0.4 units, gas 200 L, 80 rooms with 150 guests.
pub fn reading_run(period: YearMonth, days: u32) -> Vec<DailyReading> {
    (0..days)
        .map(|i| steady_reading(period.first_day() + chrono::Days::new(u64::from(i)), i))
        .collect()
}

/// The reading that would follow `reading_run(period, days_in_month)` on the
/// 1st of the next month.
pub fn closing_reading(period: YearMonth) -> DailyReading {
    steady_reading(period.next().first_day(), period.days_in_month())
}

fn steady_reading(date: NaiveDate, i: u32) -> DailyReading {
    let n = f64::from(i);
    DailyReading {
        date,
        electricity_base: Some(1_000.0 + 2.0 * n),
        electricity_intermediate: Some(500.0 + n),
        electricity_peak: Some(200.0 + 0.5 * n),
        water_municipal: Some(10_000.0 + 30.0 * n),
        water_witness_meter: Some(9_000.0 + 30.0 * n),
        water_desalinated: Some(4_000.0 + 10.0 * n),
        reactive_power: Some(300.0 + n),
        demand_base: Some(0.3),
        demand_intermediate: Some(0.35),
        demand_peak: Some(0.4),
        gas_consumption: 200.0,
        occupancy_guests: Some(150),
        occupied_rooms: Some(80),
        exchange_rate: Some(17.2),
    }
}

/// All tanks at the same level.
pub fn tanks(period: YearMonth, pct: f64) -> GasTankSnapshot {
    GasTankSnapshot::uniform(period, pct)
}

//! Cumulative-meter differencing across a month and its closing reading.
//!
//! Each pair of consecutive readings `(prev, curr)` yields one
//! [`DailyConsumption`] dated `prev.date`. The last day of a month can only be
//! closed by the first reading of the following month, so a month is always
//! resolved together with its [`PeriodClose`].

use tracing::warn;

use crate::readings::{DailyReading, YearMonth};

use super::numeric::{finite_or_zero, guarded_mul};
use super::types::DailyConsumption;

/// How a month's reading run ends.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodClose {
    /// The following month's first reading is known; every day can be differenced.
    Closed(DailyReading),
    /// No later reading exists yet. The final day carries only its logged gas.
    Open,
}

/// The readings of one month plus the state of its closing reading.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthReadings {
    pub period: YearMonth,
    pub readings: Vec<DailyReading>,
    pub close: PeriodClose,
}

impl MonthReadings {
    pub fn new(period: YearMonth, readings: Vec<DailyReading>, close: PeriodClose) -> Self {
        Self {
            period,
            readings,
            close,
        }
    }

    /// Slices one month out of a property's date-sorted reading history.
    ///
    /// The closing reading is the earliest reading dated in the following
    /// calendar month; without one the period stays [`PeriodClose::Open`].
    pub fn from_history(period: YearMonth, history: &[DailyReading]) -> Self {
        let readings: Vec<DailyReading> = history
            .iter()
            .filter(|r| period.contains(r.date))
            .cloned()
            .collect();
        let next = period.next();
        let close = history
            .iter()
            .filter(|r| next.contains(r.date))
            .min_by_key(|r| r.date)
            .cloned()
            .map_or(PeriodClose::Open, PeriodClose::Closed);
        Self::new(period, readings, close)
    }
}

/// Converts reading sequences into per-day consumption.
#[derive(Debug, Clone, Copy)]
pub struct DeltaResolver {
    multiplier: f64,
}

impl DeltaResolver {
    /// Creates a resolver applying `multiplier` (the instrument-transformer
    /// ratio) to energy, reactive and demand readings.
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    /// Resolves one month.
    ///
    /// Readings outside `month.period` and repeated dates are dropped. The
    /// result has one record per remaining reading: for a closed period every
    /// record carries meter deltas, for an open period the last record carries
    /// only gas.
    pub fn resolve(&self, month: &MonthReadings) -> Vec<DailyConsumption> {
        let readings = in_period(month);
        let Some(last) = readings.last() else {
            return Vec::new();
        };

        let closing = match &month.close {
            PeriodClose::Closed(r) if month.period.next().contains(r.date) => {
                Some(r)
            }
            PeriodClose::Closed(r) => {
                warn!(
                    period = %month.period,
                    date = %r.date,
                    "closing reading is not in the following month; treating period as open"
                );
                None
            }
            PeriodClose::Open => None,
        };

        let mut days = Vec::with_capacity(readings.len());
        for pair in readings.windows(2) {
            days.push(self.resolve_pair(pair[0], pair[1]));
        }
        match closing {
            Some(next) => days.push(self.resolve_pair(last, next)),
            None => days.push(gas_only(last)),
        }
        days
    }

    /// Resolves the day `prev.date` from the pair `(prev, curr)`.
    pub fn resolve_pair(&self, prev: &DailyReading, curr: &DailyReading) -> DailyConsumption {
        let date = prev.date;
        let energy = |meter: &'static str, p: Option<f64>, c: Option<f64>| {
            guarded_mul(cumulative_delta(date, meter, p, c), self.multiplier)
        };
        let demand = |d: Option<f64>| guarded_mul(d.unwrap_or(0.0), self.multiplier).max(0.0);

        DailyConsumption {
            date,
            has_meter_delta: true,
            energy_base_kwh: energy("electricity_base", prev.electricity_base, curr.electricity_base),
            energy_intermediate_kwh: energy(
                "electricity_intermediate",
                prev.electricity_intermediate,
                curr.electricity_intermediate,
            ),
            energy_peak_kwh: energy("electricity_peak", prev.electricity_peak, curr.electricity_peak),
            reactive_kvarh: energy("reactive_power", prev.reactive_power, curr.reactive_power),
            water_municipal_m3: cumulative_delta(
                date,
                "water_municipal",
                prev.water_municipal,
                curr.water_municipal,
            ),
            water_witness_m3: cumulative_delta(
                date,
                "water_witness_meter",
                prev.water_witness_meter,
                curr.water_witness_meter,
            ),
            water_desalinated_m3: cumulative_delta(
                date,
                "water_desalinated",
                prev.water_desalinated,
                curr.water_desalinated,
            ),
            // Gas is billed to the day it was logged on, never differenced.
            gas_liters: logged_gas(prev),
            demand_base_kw: demand(prev.demand_base),
            demand_intermediate_kw: demand(prev.demand_intermediate),
            demand_peak_kw: demand(prev.demand_peak),
            occupancy_guests: prev.occupancy_guests.unwrap_or(0),
            occupied_rooms: prev.occupied_rooms.unwrap_or(0),
        }
    }
}

/// Readings of the period in date order, one per date.
fn in_period(month: &MonthReadings) -> Vec<&DailyReading> {
    let mut readings: Vec<&DailyReading> = Vec::with_capacity(month.readings.len());
    for r in &month.readings {
        if month.period.contains(r.date) {
            readings.push(r);
        } else {
            warn!(period = %month.period, date = %r.date, "dropping reading outside period");
        }
    }
    readings.sort_by_key(|r| r.date);
    let before = readings.len();
    readings.dedup_by_key(|r| r.date);
    if readings.len() != before {
        warn!(
            period = %month.period,
            dropped = before - readings.len(),
            "dropping readings with repeated dates"
        );
    }
    readings
}

fn gas_only(reading: &DailyReading) -> DailyConsumption {
    DailyConsumption {
        date: reading.date,
        has_meter_delta: false,
        gas_liters: logged_gas(reading),
        occupancy_guests: reading.occupancy_guests.unwrap_or(0),
        occupied_rooms: reading.occupied_rooms.unwrap_or(0),
        ..DailyConsumption::default()
    }
}

fn logged_gas(reading: &DailyReading) -> f64 {
    if !reading.gas_consumption.is_finite() {
        warn!(date = %reading.date, "non-finite gas consumption coerced to 0");
    }
    finite_or_zero(reading.gas_consumption)
}

/// `max(0, curr - prev)` for a cumulative counter; 0 when either side is
/// null or non-finite.
fn cumulative_delta(
    date: chrono::NaiveDate,
    meter: &'static str,
    prev: Option<f64>,
    curr: Option<f64>,
) -> f64 {
    let (Some(prev), Some(curr)) = (prev, curr) else {
        return 0.0;
    };
    if !prev.is_finite() || !curr.is_finite() {
        warn!(%date, meter, "non-finite meter reading coerced to 0");
        return 0.0;
    }
    let delta = curr - prev;
    if delta < 0.0 {
        warn!(%date, meter, prev, curr, "meter regression clamped to 0");
        return 0.0;
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn jan() -> YearMonth {
        YearMonth::new(2024, 1).unwrap()
    }

    fn reading(d: NaiveDate, base: f64, gas: f64) -> DailyReading {
        DailyReading {
            electricity_base: Some(base),
            gas_consumption: gas,
            ..DailyReading::empty(d)
        }
    }

    #[test]
    fn energy_delta_uses_meter_multiplier() {
        let month = MonthReadings::new(
            jan(),
            vec![reading(date(2024, 1, 1), 1000.0, 0.0)],
            PeriodClose::Closed(reading(date(2024, 2, 1), 1010.0, 0.0)),
        );
        let prev = reading(date(2024, 1, 1), 1000.0, 0.0);
        let curr = reading(date(2024, 1, 2), 1010.0, 0.0);
        let day = DeltaResolver::new(700.0).resolve_pair(&prev, &curr);
        assert_eq!(day.date, date(2024, 1, 1));
        assert_eq!(day.energy_base_kwh, 7000.0);

        let days = DeltaResolver::new(700.0).resolve(&month);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].energy_base_kwh, 7000.0);
    }

    #[test]
    fn regression_clamps_to_zero() {
        let prev = reading(date(2024, 1, 1), 1000.0, 0.0);
        let curr = reading(date(2024, 1, 2), 10.0, 0.0);
        let day = DeltaResolver::new(700.0).resolve_pair(&prev, &curr);
        assert_eq!(day.energy_base_kwh, 0.0);
    }

    #[test]
    fn null_water_yields_zero_without_affecting_energy() {
        let prev = DailyReading {
            water_municipal: None,
            water_desalinated: Some(5.0),
            ..reading(date(2024, 1, 1), 100.0, 0.0)
        };
        let curr = DailyReading {
            water_municipal: Some(40.0),
            water_desalinated: Some(7.5),
            ..reading(date(2024, 1, 2), 101.0, 0.0)
        };
        let day = DeltaResolver::new(700.0).resolve_pair(&prev, &curr);
        assert_eq!(day.water_municipal_m3, 0.0);
        assert_eq!(day.water_desalinated_m3, 2.5);
        assert_eq!(day.energy_base_kwh, 700.0);
    }

    #[test]
    fn demand_comes_from_earlier_reading() {
        let prev = DailyReading {
            demand_peak: Some(0.5),
            demand_base: Some(0.2),
            ..DailyReading::empty(date(2024, 1, 1))
        };
        let curr = DailyReading {
            demand_peak: Some(9.0),
            ..DailyReading::empty(date(2024, 1, 2))
        };
        let day = DeltaResolver::new(700.0).resolve_pair(&prev, &curr);
        assert_eq!(day.demand_peak_kw, 350.0);
        assert!((day.demand_base_kw - 140.0).abs() < 1e-9);
        assert_eq!(day.demand_intermediate_kw, 0.0);
    }

    #[test]
    fn reactive_delta_is_multiplied() {
        let prev = DailyReading {
            reactive_power: Some(50.0),
            ..DailyReading::empty(date(2024, 1, 1))
        };
        let curr = DailyReading {
            reactive_power: Some(52.0),
            ..DailyReading::empty(date(2024, 1, 2))
        };
        let day = DeltaResolver::new(700.0).resolve_pair(&prev, &curr);
        assert_eq!(day.reactive_kvarh, 1400.0);
    }

    #[test]
    fn gas_is_attributed_to_the_logging_day() {
        let readings = vec![
            reading(date(2024, 1, 1), 0.0, 11.0),
            reading(date(2024, 1, 2), 0.0, 22.0),
            reading(date(2024, 1, 3), 0.0, 33.0),
        ];
        let month = MonthReadings::new(jan(), readings, PeriodClose::Open);
        let days = DeltaResolver::new(700.0).resolve(&month);
        let gas: Vec<f64> = days.iter().map(|d| d.gas_liters).collect();
        assert_eq!(gas, vec![11.0, 22.0, 33.0]);
    }

    #[test]
    fn open_period_ends_with_gas_only_day() {
        let readings = vec![
            reading(date(2024, 1, 1), 100.0, 1.0),
            reading(date(2024, 1, 2), 110.0, 2.0),
        ];
        let month = MonthReadings::new(jan(), readings, PeriodClose::Open);
        let days = DeltaResolver::new(700.0).resolve(&month);
        assert_eq!(days.len(), 2);
        assert!(days[0].has_meter_delta);
        assert!(!days[1].has_meter_delta);
        assert_eq!(days[1].energy_base_kwh, 0.0);
        assert_eq!(days[1].gas_liters, 2.0);
    }

    #[test]
    fn closed_period_differences_the_last_day() {
        let readings = vec![
            reading(date(2024, 1, 30), 100.0, 1.0),
            reading(date(2024, 1, 31), 110.0, 2.0),
        ];
        let close = PeriodClose::Closed(reading(date(2024, 2, 1), 115.0, 3.0));
        let month = MonthReadings::new(jan(), readings, close);
        let days = DeltaResolver::new(700.0).resolve(&month);
        assert_eq!(days.len(), 2);
        assert!(days[1].has_meter_delta);
        assert_eq!(days[1].energy_base_kwh, 3500.0);
        assert_eq!(days[1].gas_liters, 2.0);
    }

    #[test]
    fn closing_reading_inside_period_is_ignored() {
        let readings = vec![reading(date(2024, 1, 1), 100.0, 1.0)];
        let close = PeriodClose::Closed(reading(date(2024, 1, 1), 200.0, 0.0));
        let month = MonthReadings::new(jan(), readings, close);
        let days = DeltaResolver::new(700.0).resolve(&month);
        assert_eq!(days.len(), 1);
        assert!(!days[0].has_meter_delta);
    }

    #[test]
    fn closing_reading_beyond_next_month_is_ignored() {
        let readings = vec![reading(date(2024, 1, 31), 1_000.0, 5.0)];
        let close = PeriodClose::Closed(reading(date(2024, 3, 20), 1_100.0, 0.0));
        let month = MonthReadings::new(jan(), readings, close);
        let days = DeltaResolver::new(700.0).resolve(&month);
        assert_eq!(days.len(), 1);
        let last = days.last().unwrap();
        assert!(!last.has_meter_delta);
        assert_eq!(last.energy_base_kwh, 0.0);
        assert_eq!(last.gas_liters, 5.0);
    }

    #[test]
    fn closing_reading_in_next_month_closes_period() {
        let readings = vec![reading(date(2024, 1, 31), 1_000.0, 5.0)];
        let close = PeriodClose::Closed(reading(date(2024, 2, 1), 1_010.0, 0.0));
        let month = MonthReadings::new(jan(), readings, close);
        let days = DeltaResolver::new(700.0).resolve(&month);
        assert!(days[0].has_meter_delta);
        assert_eq!(days[0].energy_base_kwh, 7_000.0);
    }

    #[test]
    fn unsorted_foreign_and_duplicate_readings_are_normalised() {
        let readings = vec![
            reading(date(2024, 1, 2), 110.0, 2.0),
            reading(date(2023, 12, 31), 50.0, 9.0),
            reading(date(2024, 1, 1), 100.0, 1.0),
            reading(date(2024, 1, 2), 999.0, 7.0),
        ];
        let month = MonthReadings::new(jan(), readings, PeriodClose::Open);
        let days = DeltaResolver::new(1.0).resolve(&month);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date(2024, 1, 1));
        assert_eq!(days[0].energy_base_kwh, 10.0);
    }

    #[test]
    fn non_finite_readings_are_coerced() {
        let prev = DailyReading {
            gas_consumption: f64::NAN,
            ..reading(date(2024, 1, 1), f64::NAN, 0.0)
        };
        let curr = reading(date(2024, 1, 2), 10.0, 0.0);
        let day = DeltaResolver::new(700.0).resolve_pair(&prev, &curr);
        assert_eq!(day.energy_base_kwh, 0.0);
        assert_eq!(day.gas_liters, 0.0);
    }

    #[test]
    fn empty_month_resolves_to_nothing() {
        let month = MonthReadings::new(jan(), Vec::new(), PeriodClose::Open);
        assert!(DeltaResolver::new(700.0).resolve(&month).is_empty());
    }

    #[test]
    fn from_history_picks_period_and_closing_reading() {
        let history = vec![
            reading(date(2023, 12, 31), 90.0, 0.0),
            reading(date(2024, 1, 1), 100.0, 0.0),
            reading(date(2024, 1, 2), 101.0, 0.0),
            reading(date(2024, 2, 1), 130.0, 0.0),
            reading(date(2024, 2, 2), 131.0, 0.0),
        ];
        let month = MonthReadings::from_history(jan(), &history);
        assert_eq!(month.readings.len(), 2);
        assert_eq!(
            month.close,
            PeriodClose::Closed(reading(date(2024, 2, 1), 130.0, 0.0))
        );

        let feb = MonthReadings::from_history(YearMonth::new(2024, 2).unwrap(), &history);
        assert_eq!(feb.close, PeriodClose::Open);
    }
}

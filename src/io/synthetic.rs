//! Seeded synthetic month: cumulative meter readings, pricing and a tank
//! snapshot that look like a mid-size resort hotel.
//!
//! The same `(period, seed, include_closing)` always yields the same month.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::engine::{MonthReadings, PeriodClose};
use crate::readings::{DailyReading, GasTankSnapshot, MonthlyPricing, YearMonth};

/// Counter state carried from one day's reading to the next.
#[derive(Debug, Clone)]
struct Counters {
    base: f64,
    intermediate: f64,
    peak: f64,
    reactive: f64,
    municipal: f64,
    witness: f64,
    desalinated: f64,
}

/// A generated month of inputs.
#[derive(Debug, Clone)]
pub struct SyntheticMonth {
    pub period: YearMonth,
    /// One reading per calendar day, in date order.
    pub readings: Vec<DailyReading>,
    /// First reading of the following month, when requested.
    pub closing: Option<DailyReading>,
    pub pricing: MonthlyPricing,
    pub tanks: GasTankSnapshot,
}

impl SyntheticMonth {
    /// The month as the delta resolver consumes it.
    pub fn month_readings(&self) -> MonthReadings {
        let close = self
            .closing
            .clone()
            .map_or(PeriodClose::Open, PeriodClose::Closed);
        MonthReadings::new(self.period, self.readings.clone(), close)
    }

    /// Readings followed by the closing reading, as a flat history.
    pub fn history(&self) -> Vec<DailyReading> {
        let mut out = self.readings.clone();
        out.extend(self.closing.clone());
        out
    }
}

/// Generates a full month of readings for `period`.
///
/// # Arguments
///
/// * `period` - Month to generate
/// * `seed` - Random seed for reproducibility
/// * `include_closing` - Whether to add the next month's first reading
pub fn generate_month(period: YearMonth, seed: u64, include_closing: bool) -> SyntheticMonth {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut counters = Counters {
        base: rng.random_range(10_000.0..20_000.0),
        intermediate: rng.random_range(5_000.0..10_000.0),
        peak: rng.random_range(2_000.0..4_000.0),
        reactive: rng.random_range(3_000.0..6_000.0),
        municipal: rng.random_range(50_000.0..80_000.0),
        witness: 0.0,
        desalinated: rng.random_range(10_000.0..20_000.0),
    };
    counters.witness = counters.municipal + rng.random_range(-500.0..500.0);

    let days = period.days_in_month() as usize;
    let mut readings = Vec::with_capacity(days);
    for date in period.first_day().iter_days().take(days) {
        readings.push(reading(&mut rng, date, &counters));
        advance(&mut rng, &mut counters);
    }

    let closing = include_closing.then(|| reading(&mut rng, period.next().first_day(), &counters));

    let pricing = MonthlyPricing {
        year: period.year,
        month: period.month,
        fixed_cost: 1_200.0,
        energy_price_base: 1.0 + rng.random_range(0.0..0.05),
        energy_price_intermediate: 1.6 + rng.random_range(0.0..0.05),
        energy_price_peak: 2.0 + rng.random_range(0.0..0.05),
        distribution_price: 110.0,
        capacity_price: 360.0,
        gas_price: 11.5 + rng.random_range(0.0..0.5),
        water_price: 45.0,
    };

    let mut levels = [0.0; GasTankSnapshot::TANKS];
    for level in &mut levels {
        *level = rng.random_range(20.0..90.0);
    }

    SyntheticMonth {
        period,
        readings,
        closing,
        pricing,
        tanks: GasTankSnapshot::new(period, levels),
    }
}

fn reading(rng: &mut StdRng, date: chrono::NaiveDate, c: &Counters) -> DailyReading {
    let rooms: u32 = rng.random_range(60..=110);
    let guests = (f64::from(rooms) * rng.random_range(1.6..2.0)).round() as u32;
    DailyReading {
        date,
        electricity_base: Some(c.base),
        electricity_intermediate: Some(c.intermediate),
        electricity_peak: Some(c.peak),
        water_municipal: Some(c.municipal),
        water_witness_meter: Some(c.witness),
        water_desalinated: Some(c.desalinated),
        reactive_power: Some(c.reactive),
        demand_base: Some(rng.random_range(0.35..0.45)),
        demand_intermediate: Some(rng.random_range(0.40..0.50)),
        demand_peak: Some(rng.random_range(0.45..0.55)),
        gas_consumption: rng.random_range(300.0..500.0),
        occupancy_guests: Some(guests),
        occupied_rooms: Some(rooms),
        exchange_rate: Some(rng.random_range(17.0..17.5)),
    }
}

fn advance(rng: &mut StdRng, c: &mut Counters) {
    let base = rng.random_range(3.5..4.5);
    let intermediate = rng.random_range(2.5..3.5);
    let peak = rng.random_range(1.2..1.8);
    c.base += base;
    c.intermediate += intermediate;
    c.peak += peak;
    c.reactive += (base + intermediate + peak) * rng.random_range(0.25..0.35);

    let municipal = rng.random_range(50.0..70.0);
    c.municipal += municipal;
    c.witness += municipal * rng.random_range(0.98..1.02);
    c.desalinated += rng.random_range(15.0..25.0);
}

//! Derived per-day and per-month quantities shared by the engine stages.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Consumption resolved for one day from a pair of consecutive readings.
///
/// Never persisted; rebuilt from the raw readings on every forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyConsumption {
    /// Day the consumption is attributed to (the earlier reading of the pair).
    pub date: NaiveDate,
    /// `false` for the trailing day of an open period, which only carries gas.
    pub has_meter_delta: bool,
    /// Base-tier energy (kWh).
    pub energy_base_kwh: f64,
    /// Intermediate-tier energy (kWh).
    pub energy_intermediate_kwh: f64,
    /// Peak-tier energy (kWh).
    pub energy_peak_kwh: f64,
    /// Reactive energy (kVArh).
    pub reactive_kvarh: f64,
    /// Municipal water (m³).
    pub water_municipal_m3: f64,
    /// Witness-meter water (m³).
    pub water_witness_m3: f64,
    /// Desalinated water (m³).
    pub water_desalinated_m3: f64,
    /// Gas logged for the day (L).
    pub gas_liters: f64,
    /// Base-tier demand (kW).
    pub demand_base_kw: f64,
    /// Intermediate-tier demand (kW).
    pub demand_intermediate_kw: f64,
    /// Peak-tier demand (kW).
    pub demand_peak_kw: f64,
    /// Guests in house (copied from the reading).
    pub occupancy_guests: u32,
    /// Occupied rooms (copied from the reading).
    pub occupied_rooms: u32,
}

impl DailyConsumption {
    /// Active energy across all tiers (kWh).
    pub fn total_energy_kwh(&self) -> f64 {
        self.energy_base_kwh + self.energy_intermediate_kwh + self.energy_peak_kwh
    }

    /// Largest demand of any tier (kW).
    pub fn max_demand_kw(&self) -> f64 {
        self.demand_base_kw
            .max(self.demand_intermediate_kw)
            .max(self.demand_peak_kw)
    }
}

/// Running maxima of demand over a period (kW). Never projected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DemandPeaks {
    pub base_kw: f64,
    pub intermediate_kw: f64,
    pub peak_kw: f64,
}

impl DemandPeaks {
    /// Folds one day's demand into the running maxima.
    pub fn observe(&mut self, day: &DailyConsumption) {
        self.base_kw = self.base_kw.max(day.demand_base_kw);
        self.intermediate_kw = self.intermediate_kw.max(day.demand_intermediate_kw);
        self.peak_kw = self.peak_kw.max(day.demand_peak_kw);
    }

    /// Maximum across all tiers.
    pub fn observed_max_kw(&self) -> f64 {
        self.base_kw.max(self.intermediate_kw).max(self.peak_kw)
    }
}

/// Accumulated consumption for a month, possibly projected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthTotals {
    pub energy_base_kwh: f64,
    pub energy_intermediate_kwh: f64,
    pub energy_peak_kwh: f64,
    pub reactive_kvarh: f64,
    pub water_municipal_m3: f64,
    pub water_witness_m3: f64,
    pub water_desalinated_m3: f64,
    pub gas_liters: f64,
    pub demand: DemandPeaks,
}

impl MonthTotals {
    /// Sums a run of daily records.
    pub fn from_days(days: &[DailyConsumption]) -> Self {
        let mut totals = Self::default();
        for d in days {
            totals.energy_base_kwh += d.energy_base_kwh;
            totals.energy_intermediate_kwh += d.energy_intermediate_kwh;
            totals.energy_peak_kwh += d.energy_peak_kwh;
            totals.reactive_kvarh += d.reactive_kvarh;
            totals.water_municipal_m3 += d.water_municipal_m3;
            totals.water_witness_m3 += d.water_witness_m3;
            totals.water_desalinated_m3 += d.water_desalinated_m3;
            totals.gas_liters += d.gas_liters;
            totals.demand.observe(d);
        }
        totals
    }

    /// Active energy across all tiers (kWh).
    pub fn total_energy_kwh(&self) -> f64 {
        self.energy_base_kwh + self.energy_intermediate_kwh + self.energy_peak_kwh
    }

    /// Multiplies every accumulated volume by `factor`; demand is left alone.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            energy_base_kwh: self.energy_base_kwh * factor,
            energy_intermediate_kwh: self.energy_intermediate_kwh * factor,
            energy_peak_kwh: self.energy_peak_kwh * factor,
            reactive_kvarh: self.reactive_kvarh * factor,
            water_municipal_m3: self.water_municipal_m3 * factor,
            water_witness_m3: self.water_witness_m3 * factor,
            water_desalinated_m3: self.water_desalinated_m3 * factor,
            gas_liters: self.gas_liters * factor,
            demand: self.demand,
        }
    }
}

impl fmt::Display for MonthTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "energy={:.1} kWh (base={:.1} int={:.1} peak={:.1}) reactive={:.1} kVArh \
             water={:.2} m³ gas={:.1} L demand_max={:.1} kW",
            self.total_energy_kwh(),
            self.energy_base_kwh,
            self.energy_intermediate_kwh,
            self.energy_peak_kwh,
            self.reactive_kvarh,
            self.water_municipal_m3,
            self.gas_liters,
            self.demand.observed_max_kw(),
        )
    }
}

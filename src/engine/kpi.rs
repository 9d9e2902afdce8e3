//! Post-hoc occupancy KPIs from a month's resolved days.

use std::fmt;

use serde::Serialize;

use super::daily_cost::{DailyCost, ledger_total};
use super::types::DailyConsumption;

/// Utility use normalised by hotel occupancy.
///
/// Computed from observed (unprojected) days only, so numerators and
/// denominators always cover the same dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyKpis {
    /// Sum of daily guest counts.
    pub guest_nights: u64,
    /// Sum of daily occupied-room counts.
    pub room_nights: u64,
    /// Active energy per occupied room-night (kWh).
    pub energy_per_room_night_kwh: Option<f64>,
    /// Municipal plus desalinated water per guest-night (m³).
    pub water_per_guest_night_m3: Option<f64>,
    /// Gas per guest-night (L).
    pub gas_per_guest_night_liters: Option<f64>,
    /// Daily-ledger cost per occupied room-night.
    pub cost_per_room_night: Option<f64>,
}

impl OccupancyKpis {
    /// Computes all KPIs from a month's daily records and its cost ledger.
    ///
    /// # Arguments
    ///
    /// * `days` - Resolved daily consumption
    /// * `ledger` - Daily cost records for the same days
    ///
    /// # Returns
    ///
    /// An `OccupancyKpis` whose ratios are `None` when nobody stayed.
    pub fn from_days(days: &[DailyConsumption], ledger: &[DailyCost]) -> Self {
        let mut guest_nights = 0_u64;
        let mut room_nights = 0_u64;
        let mut energy = 0.0_f64;
        let mut water = 0.0_f64;
        let mut gas = 0.0_f64;

        for d in days {
            guest_nights += u64::from(d.occupancy_guests);
            room_nights += u64::from(d.occupied_rooms);
            energy += d.total_energy_kwh();
            // The witness meter duplicates the municipal supply.
            water += d.water_municipal_m3 + d.water_desalinated_m3;
            gas += d.gas_liters;
        }

        let per = |value: f64, count: u64| (count > 0).then(|| value / count as f64);

        Self {
            guest_nights,
            room_nights,
            energy_per_room_night_kwh: per(energy, room_nights),
            water_per_guest_night_m3: per(water, guest_nights),
            gas_per_guest_night_liters: per(gas, guest_nights),
            cost_per_room_night: per(ledger_total(ledger), room_nights),
        }
    }
}

fn fmt_ratio(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.3} {unit}").trim_end().to_string(),
        None => "n/a".to_string(),
    }
}

impl fmt::Display for OccupancyKpis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Occupancy KPIs ---")?;
        writeln!(f, "Guest-nights:          {}", self.guest_nights)?;
        writeln!(f, "Room-nights:           {}", self.room_nights)?;
        writeln!(
            f,
            "Energy per room-night: {}",
            fmt_ratio(self.energy_per_room_night_kwh, "kWh")
        )?;
        writeln!(
            f,
            "Water per guest-night: {}",
            fmt_ratio(self.water_per_guest_night_m3, "m³")
        )?;
        writeln!(
            f,
            "Gas per guest-night:   {}",
            fmt_ratio(self.gas_per_guest_night_liters, "L")
        )?;
        write!(
            f,
            "Cost per room-night:   {}",
            fmt_ratio(self.cost_per_room_night, "")
        )
    }
}

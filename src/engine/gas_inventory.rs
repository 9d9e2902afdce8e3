//! Stored gas volume, value and autonomy from a tank snapshot.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::config::GasConfig;
use crate::readings::{GasTankSnapshot, YearMonth};

use super::numeric::{finite_or_zero, guarded_div, guarded_mul};
use super::types::DailyConsumption;

/// How long the stored gas lasts at the current consumption rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Autonomy {
    Days(f64),
    /// No consumption recorded; the stock never runs out.
    Unbounded,
}

impl fmt::Display for Autonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(d) => write!(f, "{d:.1} days"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Gas stock analysis for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasInventory {
    pub period: Option<YearMonth>,
    /// Stored volume across all tanks (L).
    pub total_liters: f64,
    /// Mean fill level across tanks (%).
    pub average_fill_pct: f64,
    /// Stored volume as a share of installed capacity (%).
    pub utilization_pct: f64,
    /// Stored volume valued at the month's gas price.
    pub inventory_value: f64,
    /// Consumption rate the autonomy is based on (L/day).
    pub average_daily_consumption: f64,
    pub autonomy: Autonomy,
}

impl fmt::Display for GasInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Gas Inventory ---")?;
        writeln!(
            f,
            "Stored:                {:.0} L ({:.1}% of capacity)",
            self.total_liters, self.utilization_pct
        )?;
        writeln!(f, "Average tank fill:     {:.1}%", self.average_fill_pct)?;
        writeln!(f, "Inventory value:       {:.2}", self.inventory_value)?;
        writeln!(
            f,
            "Daily consumption:     {:.1} L/day",
            self.average_daily_consumption
        )?;
        write!(f, "Autonomy:              {}", self.autonomy)
    }
}

/// Values tank snapshots against the installation's capacity.
#[derive(Debug, Clone)]
pub struct GasInventoryAnalyzer {
    tank_capacity_liters: f64,
    total_capacity_liters: f64,
}

impl GasInventoryAnalyzer {
    pub fn new(config: &GasConfig) -> Self {
        Self {
            tank_capacity_liters: config.tank_capacity_liters,
            total_capacity_liters: config.total_capacity_liters(),
        }
    }

    /// Analyzes a snapshot.
    ///
    /// # Arguments
    ///
    /// * `snapshot` - Fill percentage of each tank
    /// * `gas_price` - Unit price the stock is valued at
    /// * `average_daily_consumption` - Liters consumed per day
    pub fn analyze(
        &self,
        snapshot: &GasTankSnapshot,
        gas_price: f64,
        average_daily_consumption: f64,
    ) -> GasInventory {
        let levels: Vec<f64> = snapshot.levels_pct.iter().map(|&p| sanitize_level(p)).collect();

        let total_liters: f64 = levels
            .iter()
            .map(|p| p * self.tank_capacity_liters / 100.0)
            .sum();
        let average_fill_pct = guarded_div(levels.iter().sum(), levels.len() as f64);
        let utilization_pct = guarded_div(total_liters * 100.0, self.total_capacity_liters);
        let inventory_value = guarded_mul(total_liters, gas_price);

        let daily = finite_or_zero(average_daily_consumption);
        let autonomy = if daily > 0.0 {
            Autonomy::Days(total_liters / daily)
        } else {
            Autonomy::Unbounded
        };

        GasInventory {
            period: snapshot.period(),
            total_liters,
            average_fill_pct,
            utilization_pct,
            inventory_value,
            average_daily_consumption: daily,
            autonomy,
        }
    }
}

impl Default for GasInventoryAnalyzer {
    fn default() -> Self {
        Self::new(&GasConfig::default())
    }
}

/// Mean gas logged per resolved day (L/day); `0.0` for no days.
pub fn average_daily_gas(days: &[DailyConsumption]) -> f64 {
    let total: f64 = days.iter().map(|d| d.gas_liters).sum();
    guarded_div(total, days.len() as f64)
}

fn sanitize_level(pct: f64) -> f64 {
    if !pct.is_finite() {
        warn!("non-finite tank level coerced to 0");
        return 0.0;
    }
    if !(0.0..=100.0).contains(&pct) {
        warn!(pct, "tank level outside 0-100 clamped");
    }
    pct.clamp(0.0, 100.0)
}

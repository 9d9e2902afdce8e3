//! Per-day cost ledger.
//!
//! Each resolved day is costed with the month's unit prices. Capacity and
//! distribution charges are month-level and are spread evenly over the
//! calendar days of the month. The fixed monthly charge and the power-factor
//! adjustment are never allocated to days, so the ledger total differs from
//! the month-level total cost.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::readings::MonthlyPricing;

use super::numeric::{guarded_div, guarded_mul};
use super::tariff::TariffBreakdown;
use super::types::DailyConsumption;

/// Cost attributed to one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCost {
    pub date: NaiveDate,
    pub energy_cost_base: f64,
    pub energy_cost_intermediate: f64,
    pub energy_cost_peak: f64,
    pub water_cost: f64,
    pub gas_cost: f64,
    /// This day's even share of the month's distribution charge.
    pub distribution_share: f64,
    /// This day's even share of the month's capacity charge.
    pub capacity_share: f64,
    pub total_cost: f64,
}

impl DailyCost {
    /// Energy cost across all tiers.
    pub fn energy_cost(&self) -> f64 {
        self.energy_cost_base + self.energy_cost_intermediate + self.energy_cost_peak
    }
}

impl fmt::Display for DailyCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  energy={:>10.2}  water={:>8.2}  gas={:>8.2}  demand={:>8.2}  total={:>10.2}",
            self.date,
            self.energy_cost(),
            self.water_cost,
            self.gas_cost,
            self.distribution_share + self.capacity_share,
            self.total_cost
        )
    }
}

/// Builds the per-day ledger for a month.
///
/// # Arguments
///
/// * `days` - Resolved daily consumption of the month
/// * `pricing` - The month's unit prices
/// * `breakdown` - Month-level costs the demand charges are prorated from
/// * `days_in_month` - Calendar days the demand charges are spread over
pub fn allocate(
    days: &[DailyConsumption],
    pricing: &MonthlyPricing,
    breakdown: &TariffBreakdown,
    days_in_month: u32,
) -> Vec<DailyCost> {
    let calendar_days = f64::from(days_in_month);
    let distribution_share = guarded_div(breakdown.distribution_cost, calendar_days);
    let capacity_share = guarded_div(breakdown.capacity_cost, calendar_days);

    days.iter()
        .map(|d| {
            let energy_cost_base = guarded_mul(d.energy_base_kwh, pricing.energy_price_base);
            let energy_cost_intermediate =
                guarded_mul(d.energy_intermediate_kwh, pricing.energy_price_intermediate);
            let energy_cost_peak = guarded_mul(d.energy_peak_kwh, pricing.energy_price_peak);
            let water_cost = guarded_mul(d.water_municipal_m3, pricing.water_price);
            let gas_cost = guarded_mul(d.gas_liters, pricing.gas_price);
            let total_cost = energy_cost_base
                + energy_cost_intermediate
                + energy_cost_peak
                + water_cost
                + gas_cost
                + distribution_share
                + capacity_share;
            DailyCost {
                date: d.date,
                energy_cost_base,
                energy_cost_intermediate,
                energy_cost_peak,
                water_cost,
                gas_cost,
                distribution_share,
                capacity_share,
                total_cost,
            }
        })
        .collect()
}

/// Sum of `total_cost` over a ledger.
pub fn ledger_total(ledger: &[DailyCost]) -> f64 {
    ledger.iter().map(|c| c.total_cost).sum()
}

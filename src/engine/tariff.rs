//! Monthly tariff costing: energy tiers, demand charges, water and gas.

use serde::Serialize;

use crate::config::DemandConfig;
use crate::readings::MonthlyPricing;

use super::numeric::{finite_or_zero, guarded_div, guarded_mul};
use super::types::MonthTotals;

/// Cost subtotals for one month before the power-factor adjustment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TariffBreakdown {
    pub energy_cost_base: f64,
    pub energy_cost_intermediate: f64,
    pub energy_cost_peak: f64,
    /// Sum of the three tier costs.
    pub energy_subtotal: f64,
    /// Demand implied by the month's energy at the tariff load factor (kW).
    pub load_factor_demand_kw: f64,
    /// Billed capacity demand (kW).
    pub capacity_demand_kw: f64,
    /// Billed distribution demand (kW).
    pub distribution_demand_kw: f64,
    pub capacity_cost: f64,
    pub distribution_cost: f64,
    pub fixed_cost: f64,
    /// Energy + capacity + distribution + fixed.
    pub electricity_subtotal: f64,
    pub water_cost: f64,
    pub gas_cost: f64,
}

/// Applies a month's unit prices to its totals.
#[derive(Debug, Clone, Copy)]
pub struct TariffCalculator {
    load_factor: f64,
    hours_per_day: f64,
}

impl TariffCalculator {
    pub fn new(config: &DemandConfig) -> Self {
        Self {
            load_factor: config.load_factor,
            hours_per_day: config.hours_per_day,
        }
    }

    /// Demand a month's energy would represent if drawn at the tariff load
    /// factor: `energy / (hours_per_day * days * load_factor)`.
    pub fn load_factor_demand_kw(&self, total_energy_kwh: f64, days_in_month: u32) -> f64 {
        let hours = self.hours_per_day * f64::from(days_in_month) * self.load_factor;
        guarded_div(total_energy_kwh, hours)
    }

    /// Costs `totals` with `pricing` over a month of `days_in_month` days.
    pub fn compute(
        &self,
        totals: &MonthTotals,
        pricing: &MonthlyPricing,
        days_in_month: u32,
    ) -> TariffBreakdown {
        let energy_cost_base = guarded_mul(totals.energy_base_kwh, pricing.energy_price_base);
        let energy_cost_intermediate = guarded_mul(
            totals.energy_intermediate_kwh,
            pricing.energy_price_intermediate,
        );
        let energy_cost_peak = guarded_mul(totals.energy_peak_kwh, pricing.energy_price_peak);
        let energy_subtotal = energy_cost_base + energy_cost_intermediate + energy_cost_peak;

        let lf_demand = self.load_factor_demand_kw(totals.total_energy_kwh(), days_in_month);
        // No peak-tier demand logged: bill the load-factor estimate instead.
        let capacity_demand_kw = if totals.demand.peak_kw == 0.0 {
            lf_demand.round()
        } else {
            totals.demand.peak_kw.min(lf_demand)
        };
        let distribution_demand_kw = totals.demand.observed_max_kw().min(lf_demand);

        let capacity_cost = guarded_mul(capacity_demand_kw, pricing.capacity_price);
        let distribution_cost = guarded_mul(distribution_demand_kw, pricing.distribution_price);
        let fixed_cost = finite_or_zero(pricing.fixed_cost);
        let electricity_subtotal = energy_subtotal + capacity_cost + distribution_cost + fixed_cost;

        TariffBreakdown {
            energy_cost_base,
            energy_cost_intermediate,
            energy_cost_peak,
            energy_subtotal,
            load_factor_demand_kw: lf_demand,
            capacity_demand_kw,
            distribution_demand_kw,
            capacity_cost,
            distribution_cost,
            fixed_cost,
            electricity_subtotal,
            water_cost: guarded_mul(totals.water_municipal_m3, pricing.water_price),
            gas_cost: guarded_mul(totals.gas_liters, pricing.gas_price),
        }
    }
}

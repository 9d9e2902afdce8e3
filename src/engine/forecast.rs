//! Month-level forecast: resolves readings, projects partial months, costs
//! the tariff, applies the power-factor adjustment and rebuilds the daily
//! ledger.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TariffConfig;
use crate::readings::{DailyReading, GasTankSnapshot, PricingTable, YearMonth};

use super::daily_cost::{self, DailyCost};
use super::delta::{DeltaResolver, MonthReadings};
use super::gas_inventory::{GasInventory, GasInventoryAnalyzer, average_daily_gas};
use super::kpi::OccupancyKpis;
use super::power_factor::{PowerFactorAdjustment, PowerFactorEngine};
use super::projection::Projection;
use super::tariff::{TariffBreakdown, TariffCalculator};
use super::types::{DailyConsumption, MonthTotals};

/// Why a month could not be forecast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastUnavailable {
    #[error("forecast unavailable for {0}: no pricing record")]
    MissingPricing(YearMonth),
    #[error("forecast unavailable for {0}: no metered daily consumption")]
    NoResolvedDays(YearMonth),
}

/// Costed forecast for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyForecast {
    pub period: YearMonth,
    pub days_in_month: u32,
    /// Number of resolved daily records.
    pub days_with_data: u32,
    pub is_projected: bool,
    pub projection_scale: f64,
    /// Totals as observed, before projection.
    pub observed: MonthTotals,
    /// Totals the costs are based on (projected when `is_projected`).
    pub totals: MonthTotals,
    pub costs: TariffBreakdown,
    pub power_factor: f64,
    pub adjustment: PowerFactorAdjustment,
    pub adjustment_is_bonus: bool,
    pub total_electricity_cost: f64,
    /// Electricity after adjustment plus water and gas.
    pub total_monthly_cost: f64,
}

impl fmt::Display for MonthlyForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.totals;
        let c = &self.costs;
        writeln!(f, "--- Monthly Forecast {} ---", self.period)?;
        writeln!(
            f,
            "Days with data:        {}/{}{}",
            self.days_with_data,
            self.days_in_month,
            if self.is_projected {
                format!(" (projected x{:.3})", self.projection_scale)
            } else {
                String::new()
            }
        )?;
        writeln!(
            f,
            "Energy:                {:.1} kWh (base {:.1}, intermediate {:.1}, peak {:.1})",
            t.total_energy_kwh(),
            t.energy_base_kwh,
            t.energy_intermediate_kwh,
            t.energy_peak_kwh
        )?;
        writeln!(f, "Reactive energy:       {:.1} kVArh", t.reactive_kvarh)?;
        writeln!(
            f,
            "Demand max:            {:.1} kW (peak tier {:.1} kW)",
            t.demand.observed_max_kw(),
            t.demand.peak_kw
        )?;
        writeln!(f, "Water (municipal):     {:.2} m³", t.water_municipal_m3)?;
        writeln!(f, "Gas:                   {:.1} L", t.gas_liters)?;
        writeln!(f, "Energy cost:           {:.2}", c.energy_subtotal)?;
        writeln!(
            f,
            "Capacity cost:         {:.2} ({:.1} kW)",
            c.capacity_cost, c.capacity_demand_kw
        )?;
        writeln!(
            f,
            "Distribution cost:     {:.2} ({:.1} kW)",
            c.distribution_cost, c.distribution_demand_kw
        )?;
        writeln!(f, "Fixed cost:            {:.2}", c.fixed_cost)?;
        writeln!(f, "Power factor:          {:.4} ({})", self.power_factor, self.adjustment)?;
        writeln!(f, "Electricity cost:      {:.2}", self.total_electricity_cost)?;
        writeln!(f, "Water cost:            {:.2}", c.water_cost)?;
        writeln!(f, "Gas cost:              {:.2}", c.gas_cost)?;
        write!(f, "Total monthly cost:    {:.2}", self.total_monthly_cost)
    }
}

/// A forecast together with the per-day records it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthReport {
    pub forecast: MonthlyForecast,
    pub days: Vec<DailyConsumption>,
    pub ledger: Vec<DailyCost>,
    pub kpis: OccupancyKpis,
}

/// Runs the full monthly pipeline against a fixed configuration and pricing
/// table.
///
/// Holds no mutable state; one engine can forecast any number of months,
/// from any number of threads.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: TariffConfig,
    pricing: PricingTable,
    resolver: DeltaResolver,
    tariff: TariffCalculator,
    power_factor: PowerFactorEngine,
    gas: GasInventoryAnalyzer,
}

impl ForecastEngine {
    pub fn new(config: TariffConfig, pricing: PricingTable) -> Self {
        Self {
            resolver: DeltaResolver::new(config.meter.multiplier),
            tariff: TariffCalculator::new(&config.demand),
            power_factor: PowerFactorEngine::new(config.power_factor.clone()),
            gas: GasInventoryAnalyzer::new(&config.gas),
            config,
            pricing,
        }
    }

    pub fn config(&self) -> &TariffConfig {
        &self.config
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// Forecasts one month.
    ///
    /// # Errors
    ///
    /// Returns `ForecastUnavailable` when the month has no pricing record or
    /// none of its days could be metered.
    pub fn forecast_month(&self, month: &MonthReadings) -> Result<MonthReport, ForecastUnavailable> {
        let period = month.period;
        let Some(pricing) = self.pricing.get(period) else {
            info!(%period, "no pricing record, skipping forecast");
            return Err(ForecastUnavailable::MissingPricing(period));
        };

        let days = self.resolver.resolve(month);
        if !days.iter().any(|d| d.has_meter_delta) {
            info!(%period, records = days.len(), "no metered days, skipping forecast");
            return Err(ForecastUnavailable::NoResolvedDays(period));
        }

        let days_in_month = period.days_in_month();
        let days_with_data = days.len() as u32;
        let projection =
            Projection::for_month(days_in_month, days_with_data, self.config.projection.min_days);
        debug!(
            %period,
            days_in_month,
            days_with_data,
            scale = projection.scale,
            projected = projection.is_projected,
            "projection decided"
        );

        let observed = MonthTotals::from_days(&days);
        let totals = projection.apply(&observed);
        let costs = self.tariff.compute(&totals, pricing, days_in_month);
        let assessment = self.power_factor.assess(
            totals.reactive_kvarh,
            totals.total_energy_kwh(),
            costs.electricity_subtotal,
        );
        let total_monthly_cost =
            assessment.total_electricity_cost + costs.water_cost + costs.gas_cost;

        let ledger = daily_cost::allocate(&days, pricing, &costs, days_in_month);
        let kpis = OccupancyKpis::from_days(&days, &ledger);

        let forecast = MonthlyForecast {
            period,
            days_in_month,
            days_with_data,
            is_projected: projection.is_projected,
            projection_scale: projection.scale,
            observed,
            totals,
            costs,
            power_factor: assessment.power_factor,
            adjustment: assessment.adjustment,
            adjustment_is_bonus: assessment.adjustment.is_bonus(),
            total_electricity_cost: assessment.total_electricity_cost,
            total_monthly_cost,
        };

        Ok(MonthReport {
            forecast,
            days,
            ledger,
            kpis,
        })
    }

    /// Forecasts every month in `first..=last` from a property's date-sorted
    /// reading history.
    pub fn forecast_range(
        &self,
        history: &[DailyReading],
        first: YearMonth,
        last: YearMonth,
    ) -> Vec<(YearMonth, Result<MonthReport, ForecastUnavailable>)> {
        let mut out = Vec::new();
        let mut period = first;
        while period <= last {
            let month = MonthReadings::from_history(period, history);
            out.push((period, self.forecast_month(&month)));
            period = period.next();
        }
        out
    }

    /// Values a tank snapshot at its month's gas price, with autonomy based on
    /// `days` (typically the same month's resolved records).
    ///
    /// # Errors
    ///
    /// Returns `ForecastUnavailable::MissingPricing` if the snapshot's month
    /// has no pricing record.
    pub fn gas_inventory(
        &self,
        snapshot: &GasTankSnapshot,
        days: &[DailyConsumption],
    ) -> Result<GasInventory, ForecastUnavailable> {
        let period = snapshot.period().unwrap_or(YearMonth {
            year: snapshot.year,
            month: snapshot.month,
        });
        let pricing = self
            .pricing
            .get(period)
            .ok_or(ForecastUnavailable::MissingPricing(period))?;
        Ok(self
            .gas
            .analyze(snapshot, pricing.gas_price, average_daily_gas(days)))
    }
}

//! Forecasting engine: meter differencing, projection, tariff costing,
//! power-factor adjustment, daily allocation and gas inventory.

/// Month-level costed ledger rebuilt per day.
pub mod daily_cost;
/// Cumulative-meter differencing with the closing-reading stitch.
pub mod delta;
pub mod forecast;
pub mod gas_inventory;
pub mod kpi;
pub mod numeric;
/// Partial-month projection.
pub mod projection;
pub mod power_factor;
/// Tariff cost calculator.
pub mod tariff;
pub mod types;

pub use delta::{DeltaResolver, MonthReadings, PeriodClose};
pub use forecast::{ForecastEngine, ForecastUnavailable, MonthReport, MonthlyForecast};
pub use gas_inventory::{Autonomy, GasInventory, GasInventoryAnalyzer};
pub use power_factor::PowerFactorAdjustment;
pub use types::{DailyConsumption, MonthTotals};

//! Raw records consumed by the forecasting engine.

pub mod types;

pub use types::{DailyReading, GasTankSnapshot, MonthlyPricing, PricingError, PricingTable, YearMonth};

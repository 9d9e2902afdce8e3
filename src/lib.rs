//! Utility-cost forecasting for a hotel property: daily consumption from
//! cumulative meters, month-level tariff costs with power-factor adjustment,
//! and gas-tank inventory.

pub mod config;
pub mod engine;
pub mod io;
pub mod logging;
pub mod readings;

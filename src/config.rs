//! TOML-based tariff policy configuration.
//!
//! Every constant that encodes utility-tariff policy (instrument-transformer
//! ratio, load factor, power-factor thresholds, tank sizes) lives here rather
//! than as a literal in the engine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::readings::GasTankSnapshot;

/// Top-level tariff configuration parsed from TOML.
///
/// All fields have defaults matching the utility schedule currently in force.
/// Load from TOML with [`TariffConfig::from_toml_file`] or use
/// [`TariffConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TariffConfig {
    /// Meter instrumentation.
    #[serde(default)]
    pub meter: MeterConfig,
    /// Demand-charge derivation.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Power-factor bonus/penalty schedule.
    #[serde(default)]
    pub power_factor: PowerFactorConfig,
    /// Partial-month projection.
    #[serde(default)]
    pub projection: ProjectionConfig,
    /// Gas storage installation.
    #[serde(default)]
    pub gas: GasConfig,
}

/// Meter instrumentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeterConfig {
    /// Instrument-transformer ratio applied to energy, reactive and demand readings.
    pub multiplier: f64,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self { multiplier: 700.0 }
    }
}

/// Demand-charge derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Tariff load factor used to infer demand from energy (0.0-1.0].
    pub load_factor: f64,
    /// Hours per billing day.
    pub hours_per_day: f64,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            load_factor: 0.57,
            hours_per_day: 24.0,
        }
    }
}

/// Power-factor bonus/penalty schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PowerFactorConfig {
    /// Below this power factor a penalty applies; at or above, a bonus.
    pub penalty_threshold: f64,
    /// Reference power factor of the bonus formula.
    pub bonus_reference: f64,
    /// Penalty rate coefficient (3/5 in the schedule).
    pub penalty_coefficient: f64,
    /// Bonus rate coefficient.
    pub bonus_coefficient: f64,
    /// Decimal places the power factor is rounded to.
    pub rounding_decimals: u32,
}

impl Default for PowerFactorConfig {
    fn default() -> Self {
        Self {
            penalty_threshold: 0.95,
            bonus_reference: 0.90,
            penalty_coefficient: 0.6,
            bonus_coefficient: 0.25,
            rounding_decimals: 4,
        }
    }
}

/// Partial-month projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Minimum daily records before a partial month is projected.
    pub min_days: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { min_days: 3 }
    }
}

/// Gas storage installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GasConfig {
    /// Number of tanks (must match the snapshot layout).
    pub tank_count: usize,
    /// Nominal capacity of each tank (L).
    pub tank_capacity_liters: f64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            tank_count: GasTankSnapshot::TANKS,
            tank_capacity_liters: 5000.0,
        }
    }
}

impl GasConfig {
    /// Capacity of the whole installation (L).
    pub fn total_capacity_liters(&self) -> f64 {
        self.tank_count as f64 * self.tank_capacity_liters
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"demand.load_factor"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl TariffConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["default"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(self.meter.multiplier > 0.0) {
            errors.push(ConfigError::new("meter.multiplier", "must be > 0"));
        }

        let d = &self.demand;
        if !(d.load_factor > 0.0 && d.load_factor <= 1.0) {
            errors.push(ConfigError::new("demand.load_factor", "must be in (0.0, 1.0]"));
        }
        if !(d.hours_per_day > 0.0) {
            errors.push(ConfigError::new("demand.hours_per_day", "must be > 0"));
        }

        let pf = &self.power_factor;
        if !(pf.penalty_threshold > 0.0 && pf.penalty_threshold <= 1.0) {
            errors.push(ConfigError::new(
                "power_factor.penalty_threshold",
                "must be in (0.0, 1.0]",
            ));
        }
        if !(pf.bonus_reference > 0.0 && pf.bonus_reference <= 1.0) {
            errors.push(ConfigError::new(
                "power_factor.bonus_reference",
                "must be in (0.0, 1.0]",
            ));
        }
        if !(pf.penalty_coefficient >= 0.0) {
            errors.push(ConfigError::new(
                "power_factor.penalty_coefficient",
                "must be >= 0",
            ));
        }
        if !(pf.bonus_coefficient >= 0.0) {
            errors.push(ConfigError::new("power_factor.bonus_coefficient", "must be >= 0"));
        }
        if pf.rounding_decimals > 10 {
            errors.push(ConfigError::new("power_factor.rounding_decimals", "must be <= 10"));
        }

        if self.projection.min_days < 2 {
            errors.push(ConfigError::new("projection.min_days", "must be >= 2"));
        }

        let gas = &self.gas;
        if gas.tank_count != GasTankSnapshot::TANKS {
            errors.push(ConfigError::new(
                "gas.tank_count",
                format!(
                    "must be {} to match the tank snapshot layout, got {}",
                    GasTankSnapshot::TANKS,
                    gas.tank_count
                ),
            ));
        }
        if !(gas.tank_capacity_liters > 0.0) {
            errors.push(ConfigError::new("gas.tank_capacity_liters", "must be > 0"));
        }

        errors
    }
}

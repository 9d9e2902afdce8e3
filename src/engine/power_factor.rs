//! Power-factor bonus/penalty model from the utility tariff schedule.
//!
//! The power factor is `cos(atan(reactive / active))`. Below the penalty
//! threshold the electricity subtotal is surcharged; at or above it a bonus
//! is deducted. Both outcomes are distinct variants so the sign of the
//! adjustment is carried by the type rather than inferred from a magnitude.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::PowerFactorConfig;

use super::numeric::{finite_or_zero, guarded_div, guarded_mul, round_to};

/// Adjustment applied to the electricity subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PowerFactorAdjustment {
    /// Surcharge added to the subtotal.
    Penalty { rate: f64, amount: f64 },
    /// Discount deducted from the subtotal.
    Bonus { rate: f64, amount: f64 },
}

impl PowerFactorAdjustment {
    pub fn is_bonus(&self) -> bool {
        matches!(self, Self::Bonus { .. })
    }

    pub fn rate(&self) -> f64 {
        match *self {
            Self::Penalty { rate, .. } | Self::Bonus { rate, .. } => rate,
        }
    }

    /// Unsigned magnitude of the adjustment.
    pub fn amount(&self) -> f64 {
        match *self {
            Self::Penalty { amount, .. } | Self::Bonus { amount, .. } => amount,
        }
    }

    /// The subtotal after the adjustment.
    pub fn apply(&self, subtotal: f64) -> f64 {
        match *self {
            Self::Penalty { amount, .. } => subtotal + amount,
            Self::Bonus { amount, .. } => subtotal - amount,
        }
    }
}

impl fmt::Display for PowerFactorAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Penalty { rate, amount } => {
                write!(f, "penalty +{amount:.2} ({:.2}%)", rate * 100.0)
            }
            Self::Bonus { rate, amount } => {
                write!(f, "bonus -{amount:.2} ({:.2}%)", rate * 100.0)
            }
        }
    }
}

/// Power factor of a month and its effect on the electricity cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerFactorAssessment {
    pub power_factor: f64,
    pub adjustment: PowerFactorAdjustment,
    /// Electricity subtotal after the adjustment.
    pub total_electricity_cost: f64,
}

/// Evaluates the bonus/penalty schedule.
#[derive(Debug, Clone)]
pub struct PowerFactorEngine {
    config: PowerFactorConfig,
}

impl PowerFactorEngine {
    pub fn new(config: PowerFactorConfig) -> Self {
        Self { config }
    }

    /// `round(cos(atan(reactive / active)), decimals)`, or `1.0` when no
    /// active energy was consumed.
    pub fn power_factor(&self, reactive_kvarh: f64, active_kwh: f64) -> f64 {
        if active_kwh == 0.0 || !active_kwh.is_finite() {
            return 1.0;
        }
        let ratio = guarded_div(reactive_kvarh, active_kwh);
        round_to(ratio.atan().cos(), self.config.rounding_decimals)
    }

    /// Bonus or penalty for `power_factor` on `subtotal`.
    pub fn adjustment(&self, power_factor: f64, subtotal: f64) -> PowerFactorAdjustment {
        let cfg = &self.config;
        // A factor that rounded to zero is floored at the rounding resolution.
        let resolution = 10_f64.powi(-(cfg.rounding_decimals as i32));
        let pf = power_factor.max(resolution);

        if power_factor < cfg.penalty_threshold {
            let rate = cfg.penalty_coefficient * (cfg.penalty_threshold / pf - 1.0);
            let rate = finite_or_zero(rate);
            PowerFactorAdjustment::Penalty {
                rate,
                amount: guarded_mul(subtotal, rate),
            }
        } else {
            let rate = cfg.bonus_coefficient * (1.0 - cfg.bonus_reference / pf);
            let rate = finite_or_zero(rate);
            PowerFactorAdjustment::Bonus {
                rate,
                amount: guarded_mul(subtotal, rate),
            }
        }
    }

    /// Computes the power factor and applies its adjustment to `subtotal`.
    pub fn assess(&self, reactive_kvarh: f64, active_kwh: f64, subtotal: f64) -> PowerFactorAssessment {
        let power_factor = self.power_factor(reactive_kvarh, active_kwh);
        let adjustment = self.adjustment(power_factor, subtotal);
        debug!(power_factor, bonus = adjustment.is_bonus(), rate = adjustment.rate(), "power factor assessed");
        PowerFactorAssessment {
            power_factor,
            adjustment,
            total_electricity_cost: adjustment.apply(subtotal),
        }
    }
}

impl Default for PowerFactorEngine {
    fn default() -> Self {
        Self::new(PowerFactorConfig::default())
    }
}

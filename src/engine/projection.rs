//! Partial-month projection.

use serde::Serialize;

use super::types::MonthTotals;

/// How a month's accumulated totals were extended to a full month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    /// Factor applied to every accumulated volume (1.0 when not projected).
    pub scale: f64,
    /// Whether the totals are an extrapolation.
    pub is_projected: bool,
}

impl Projection {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        is_projected: false,
    };

    /// Decides the projection for a month.
    ///
    /// Applies when `min_days <= days_with_data < days_in_month`, with scale
    /// `days_in_month / (days_with_data - 1)`: the last record of a run has no
    /// closing delta, so `n` records carry `n - 1` days of metered consumption.
    pub fn for_month(days_in_month: u32, days_with_data: u32, min_days: u32) -> Self {
        let min_days = min_days.max(2);
        if days_with_data < min_days || days_with_data >= days_in_month {
            return Self::IDENTITY;
        }
        Self {
            scale: f64::from(days_in_month) / f64::from(days_with_data - 1),
            is_projected: true,
        }
    }

    /// Applies the scale to the accumulated volumes; demand maxima are kept.
    pub fn apply(&self, totals: &MonthTotals) -> MonthTotals {
        if self.is_projected {
            totals.scaled(self.scale)
        } else {
            totals.clone()
        }
    }
}

//! The five decline-curve linearizations

use crate::data::SeriesChannel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decline-curve linearization method.
///
/// Declaration order is the tie-break order used when two methods forecast
/// the same residual reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeclineMethod {
    /// Water-liquid ratio against cumulative water
    WaterRatio,
    /// Water-liquid ratio against cumulative liquid
    LiquidRatio,
    /// Water-liquid ratio against cumulative oil
    Fractional,
    /// Log cumulative water against cumulative oil
    ExponentialWater,
    /// Log cumulative liquid against cumulative oil
    ExponentialLiquid,
}

impl DeclineMethod {
    /// Every method in tie-break order
    pub const ALL: [DeclineMethod; 5] = [
        DeclineMethod::WaterRatio,
        DeclineMethod::LiquidRatio,
        DeclineMethod::Fractional,
        DeclineMethod::ExponentialWater,
        DeclineMethod::ExponentialLiquid,
    ];

    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            DeclineMethod::WaterRatio => "A",
            DeclineMethod::LiquidRatio => "B",
            DeclineMethod::Fractional => "C",
            DeclineMethod::ExponentialWater => "D",
            DeclineMethod::ExponentialLiquid => "E",
        }
    }

    /// Regressor of the linearization
    pub fn independent(&self) -> SeriesChannel {
        match self {
            DeclineMethod::WaterRatio => SeriesChannel::CumulativeWater,
            DeclineMethod::LiquidRatio => SeriesChannel::CumulativeLiquid,
            DeclineMethod::Fractional
            | DeclineMethod::ExponentialWater
            | DeclineMethod::ExponentialLiquid => SeriesChannel::CumulativeOil,
        }
    }

    /// Response of the linearization
    pub fn dependent(&self) -> SeriesChannel {
        match self {
            DeclineMethod::WaterRatio | DeclineMethod::LiquidRatio | DeclineMethod::Fractional => {
                SeriesChannel::WaterLiquidRatio
            }
            DeclineMethod::ExponentialWater => SeriesChannel::LogCumulativeWater,
            DeclineMethod::ExponentialLiquid => SeriesChannel::LogCumulativeLiquid,
        }
    }

    /// Ultimate recoverable reserves from the fitted intercept `a`, slope
    /// magnitude `b` and recovery fraction `r`.
    ///
    /// A zero slope gives zero reserves. Invalid intermediate values surface
    /// as NaN rather than panicking.
    pub fn ultimate_reserves(&self, a: f64, b: f64, r: f64) -> f64 {
        if b == 0.0 {
            return 0.0;
        }

        match self {
            DeclineMethod::WaterRatio => (1.0 / b) * (1.0 - ((a - 1.0) * (1.0 - r) / r).sqrt()),
            DeclineMethod::LiquidRatio => 1.0 / b - ((1.0 - r) * a / (b * b)).sqrt(),
            DeclineMethod::Fractional => 1.0 / (2.0 * b * (1.0 - r)) - a / (2.0 * b),
            DeclineMethod::ExponentialWater | DeclineMethod::ExponentialLiquid => {
                (1.0 / b) * (r / ((1.0 - r) * b * a.exp())).ln()
            }
        }
    }
}

impl fmt::Display for DeclineMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclineMethod::WaterRatio => "water-ratio",
            DeclineMethod::LiquidRatio => "liquid-ratio",
            DeclineMethod::Fractional => "fractional",
            DeclineMethod::ExponentialWater => "exponential-water",
            DeclineMethod::ExponentialLiquid => "exponential-liquid",
        };
        write!(f, "{} ({})", self.label(), name)
    }
}

//! Run configuration: business bounds plus tunable estimation constants
//!
//! Bounds have no sensible defaults and must always be supplied. Every
//! constant defaults to the value the estimation rules were calibrated with,
//! so a TOML file only needs to name the ones it changes.

use crate::error::{ReservesError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Business bounds applied to every well's residual reserves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReservesBounds {
    /// Floor for any reported residual reserves, mass units
    pub min_reserves: f64,
    /// Nearest-neighbor distance beyond which a fallback well is flagged
    pub max_neighbor_distance: f64,
    /// Shortest acceptable remaining life, years
    pub year_min: f64,
    /// Longest acceptable remaining life, years
    pub year_max: f64,
}

impl ReservesBounds {
    /// Create validated bounds
    pub fn new(
        min_reserves: f64,
        max_neighbor_distance: f64,
        year_min: f64,
        year_max: f64,
    ) -> Result<Self> {
        let bounds = Self {
            min_reserves,
            max_neighbor_distance,
            year_min,
            year_max,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check that every bound is finite, non-negative and ordered
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("min_reserves", self.min_reserves),
            ("max_neighbor_distance", self.max_neighbor_distance),
            ("year_min", self.year_min),
            ("year_max", self.year_max),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ReservesError::InvalidParameter(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.year_min > self.year_max {
            return Err(ReservesError::InvalidParameter(format!(
                "year_min ({}) must not exceed year_max ({})",
                self.year_min, self.year_max
            )));
        }

        Ok(())
    }
}

/// Constants of the estimation rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConstants {
    /// Fraction of the mobile oil assumed recoverable
    pub recovery_fraction: f64,
    /// Minimum correlation magnitude for an accepted method
    pub correlation_threshold: f64,
    /// Forecast remaining life must stay strictly below this, years
    pub max_forecast_years: f64,
    /// A last month below this share of the prior month is dropped as a spike
    pub spike_ratio: f64,
    /// Months-per-year factor applied to the summed last two monthly rates
    pub rate_multiplier: f64,
    /// Largest field map still interpolated piecewise-linearly
    pub sparse_map_limit: usize,
}

impl Default for EstimationConstants {
    fn default() -> Self {
        Self {
            recovery_fraction: 0.99,
            correlation_threshold: 0.7,
            max_forecast_years: 50.0,
            spike_ratio: 0.25,
            rate_multiplier: 6.0,
            sparse_map_limit: 16,
        }
    }
}

impl EstimationConstants {
    /// Check that the constants keep the reserves formulas well defined
    pub fn validate(&self) -> Result<()> {
        if !(self.recovery_fraction > 0.0 && self.recovery_fraction < 1.0) {
            return Err(ReservesError::InvalidParameter(format!(
                "recovery_fraction must lie strictly between 0 and 1, got {}",
                self.recovery_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.correlation_threshold) {
            return Err(ReservesError::InvalidParameter(format!(
                "correlation_threshold must lie in [0, 1], got {}",
                self.correlation_threshold
            )));
        }
        if !(self.max_forecast_years.is_finite() && self.max_forecast_years > 0.0) {
            return Err(ReservesError::InvalidParameter(format!(
                "max_forecast_years must be positive, got {}",
                self.max_forecast_years
            )));
        }
        if !(self.spike_ratio.is_finite() && self.spike_ratio >= 0.0) {
            return Err(ReservesError::InvalidParameter(format!(
                "spike_ratio must be non-negative, got {}",
                self.spike_ratio
            )));
        }
        if !(self.rate_multiplier.is_finite() && self.rate_multiplier >= 0.0) {
            return Err(ReservesError::InvalidParameter(format!(
                "rate_multiplier must be non-negative, got {}",
                self.rate_multiplier
            )));
        }
        Ok(())
    }
}

/// Complete configuration of an aggregation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReservesConfig {
    pub bounds: ReservesBounds,
    #[serde(default)]
    pub constants: EstimationConstants,
}

impl ReservesConfig {
    /// Create a validated configuration
    pub fn new(bounds: ReservesBounds, constants: EstimationConstants) -> Result<Self> {
        let config = Self { bounds, constants };
        config.validate()?;
        Ok(config)
    }

    /// Configuration with the default constants
    pub fn with_bounds(bounds: ReservesBounds) -> Result<Self> {
        Self::new(bounds, EstimationConstants::default())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ReservesError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "Loaded reserves config");
        Ok(config)
    }

    /// Validate bounds and constants
    pub fn validate(&self) -> Result<()> {
        self.bounds.validate()?;
        self.constants.validate()
    }
}

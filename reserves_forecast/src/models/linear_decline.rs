//! Least-squares fit of a decline linearization and its inversion to reserves

use crate::data::{CumulativeSeries, SeriesChannel};
use crate::error::{ReservesError, Result};
use crate::models::{DeclineMethod, MethodResult, ReservesModel};
use reserves_math::{pearson_correlation, LinearRegression};

/// One decline method with its recovery fraction
#[derive(Debug, Clone)]
pub struct LinearDeclineModel {
    name: String,
    method: DeclineMethod,
    recovery_fraction: f64,
}

impl LinearDeclineModel {
    /// Create a model for a method
    pub fn new(method: DeclineMethod, recovery_fraction: f64) -> Result<Self> {
        if !(recovery_fraction > 0.0 && recovery_fraction < 1.0) {
            return Err(ReservesError::InvalidParameter(
                "Recovery fraction must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Linear decline {} (R={})", method, recovery_fraction),
            method,
            recovery_fraction,
        })
    }

    /// Method of this model
    pub fn method(&self) -> DeclineMethod {
        self.method
    }

    /// Recovery fraction of this model
    pub fn recovery_fraction(&self) -> f64 {
        self.recovery_fraction
    }

    /// Fit the method to a cumulative series.
    ///
    /// Residual reserves are taken against the cumulative oil of the last
    /// point of `series`. The correlation is the same water-cut correlation
    /// for every method.
    pub fn fit(&self, series: &CumulativeSeries) -> Result<MethodResult> {
        let x = series.channel(self.method.independent());
        let y = series.channel(self.method.dependent());
        let fit = LinearRegression::fit_samples(&x, &y)?;

        let a = fit.intercept;
        let b = fit.slope.abs();
        let current_cumulative = series.last().map_or(0.0, |p| p.cumulative_oil);

        let (ultimate_reserves, residual_reserves) = if b == 0.0 {
            (0.0, 0.0)
        } else {
            let ultimate = self.method.ultimate_reserves(a, b, self.recovery_fraction);
            (ultimate, ultimate - current_cumulative)
        };

        let correlation = pearson_correlation(
            &series.channel(SeriesChannel::CumulativeWater),
            &series.channel(SeriesChannel::WaterLiquidRatio),
        )
        .abs();

        Ok(MethodResult {
            method: self.method,
            ultimate_reserves,
            residual_reserves,
            correlation,
            determination: fit.r_squared,
            slope: fit.slope,
            intercept: fit.intercept,
        })
    }
}

impl ReservesModel for LinearDeclineModel {
    fn estimate(&self, series: &CumulativeSeries) -> Result<MethodResult> {
        self.fit(series)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

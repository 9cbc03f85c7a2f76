//! Ordinary least squares for a single regressor
//!
//! Decline-curve linearizations reduce every reserves method to fitting
//! `y = intercept + slope * x` over a handful of monthly points, so the fit
//! has to stay well defined for two points and for degenerate inputs.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Accumulates (x, y) samples and fits a straight line through them
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    x: Vec<f64>,
    y: Vec<f64>,
}

/// Parameters of a fitted straight line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Slope of the fitted line
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
    /// Coefficient of determination (R-squared) of the fit
    pub r_squared: f64,
    /// Number of samples used
    pub samples: usize,
}

impl LinearFit {
    /// Evaluate the fitted line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

impl LinearRegression {
    /// Create an empty regression
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a regression from paired samples
    pub fn from_samples(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(MathError::InvalidInput(format!(
                "Sample lengths differ: {} x values, {} y values",
                x.len(),
                y.len()
            )));
        }

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }

    /// Fit a line through paired samples in one call
    pub fn fit_samples(x: &[f64], y: &[f64]) -> Result<LinearFit> {
        Self::from_samples(x, y)?.fit()
    }

    /// Add a new sample
    pub fn update(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    /// Number of samples collected so far
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check whether no samples have been collected
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Fit the line by ordinary least squares.
    ///
    /// When every x value is identical the slope is reported as exactly zero
    /// and the intercept as the mean of y, which is the minimum-norm least
    /// squares solution.
    pub fn fit(&self) -> Result<LinearFit> {
        if self.is_empty() {
            return Err(MathError::InsufficientData(
                "Not enough data for a linear fit. Need at least 1 point.".to_string(),
            ));
        }

        let n = self.len() as f64;
        let x_mean = self.x.iter().sum::<f64>() / n;
        let y_mean = self.y.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (&x, &y) in self.x.iter().zip(self.y.iter()) {
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }

        let slope = if denominator == 0.0 {
            0.0
        } else {
            numerator / denominator
        };
        let intercept = y_mean - slope * x_mean;

        let r_squared = self.r_squared(slope, intercept, y_mean);

        Ok(LinearFit {
            slope,
            intercept,
            r_squared,
            samples: self.len(),
        })
    }

    fn r_squared(&self, slope: f64, intercept: f64, y_mean: f64) -> f64 {
        if self.len() < 2 {
            return f64::NAN;
        }

        let mut ss_total = 0.0;
        let mut ss_residual = 0.0;
        for (&x, &y) in self.x.iter().zip(self.y.iter()) {
            let y_pred = slope * x + intercept;
            ss_total += (y - y_mean).powi(2);
            ss_residual += (y - y_pred).powi(2);
        }

        if ss_total == 0.0 {
            // Constant target: a perfect fit explains everything, anything else nothing
            if ss_residual == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_residual / ss_total
        }
    }
}

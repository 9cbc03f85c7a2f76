//! Per-well method selection
//!
//! A pass runs every decline method over the well's cumulative series,
//! discards methods failing the acceptance rules and keeps the one with the
//! largest residual reserves.

use crate::config::EstimationConstants;
use crate::data::{CumulativeSeries, WellHistory, WellId};
use crate::error::{EstimationFailure, Result};
use crate::models::{DeclineMethod, LinearDeclineModel, MethodResult, ReservesModel};
use crate::utils::forecast_life_years;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Which part of the history a pass fits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstimationPass {
    /// Every monthly point
    AllPoints,
    /// The last three points, minus a collapsing last month
    LastThreePoints,
}

impl EstimationPass {
    /// Minimum history length the pass accepts
    pub fn required_points(&self) -> usize {
        match self {
            EstimationPass::AllPoints => 2,
            EstimationPass::LastThreePoints => 3,
        }
    }
}

impl fmt::Display for EstimationPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimationPass::AllPoints => write!(f, "all points"),
            EstimationPass::LastThreePoints => write!(f, "last 3 points"),
        }
    }
}

/// Accepted reserves estimate of one well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellReservesEstimate {
    pub well: WellId,
    pub pass: EstimationPass,
    pub method: DeclineMethod,
    pub ultimate_reserves: f64,
    pub residual_reserves: f64,
    pub correlation: f64,
    pub determination: f64,
    /// Oil rate of the last fitted month
    pub last_oil_rate: f64,
    /// Oil rate of the month before the last one of the history tail
    pub penultimate_oil_rate: f64,
    /// Cumulative oil at the last fitted month
    pub cumulative_oil: f64,
    pub forecast_life_years: f64,
    pub elapsed_years: i32,
    pub x: f64,
    pub y: f64,
}

/// All method results of one pass, before any acceptance rule
#[derive(Debug, Clone, PartialEq)]
pub struct PassEvaluation {
    pub pass: EstimationPass,
    pub last_oil_rate: f64,
    pub penultimate_oil_rate: f64,
    pub cumulative_oil: f64,
    pub elapsed_years: i32,
    pub x: f64,
    pub y: f64,
    /// Results in method order
    pub results: Vec<MethodResult>,
}

impl PassEvaluation {
    /// Forecast remaining life implied by a result
    pub fn forecast_life(&self, result: &MethodResult) -> f64 {
        forecast_life_years(result.residual_reserves, self.last_oil_rate)
    }
}

/// Runs the decline methods for a well and picks the best accepted one
#[derive(Debug, Clone)]
pub struct WellReservesSelector {
    models: Vec<LinearDeclineModel>,
    constants: EstimationConstants,
}

impl WellReservesSelector {
    /// Create a selector running every method
    pub fn new(constants: EstimationConstants) -> Result<Self> {
        constants.validate()?;
        let models = DeclineMethod::ALL
            .iter()
            .map(|&method| LinearDeclineModel::new(method, constants.recovery_fraction))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { models, constants })
    }

    /// Run every method of a pass without filtering
    pub fn evaluate(
        &self,
        history: &WellHistory,
        pass: EstimationPass,
    ) -> std::result::Result<PassEvaluation, EstimationFailure> {
        let series = history.cumulative();
        let required = pass.required_points();
        if series.len() < required {
            return Err(EstimationFailure::InsufficientHistory {
                required,
                available: series.len(),
            });
        }

        let (fitted, penultimate_oil_rate) = match pass {
            EstimationPass::AllPoints => {
                let penultimate = series.penultimate().map_or(0.0, |p| p.oil_rate);
                (series, penultimate)
            }
            EstimationPass::LastThreePoints => self.trim_tail(history.well(), &series),
        };

        let (last_oil_rate, cumulative_oil) = match fitted.last() {
            Some(last) => (last.oil_rate, last.cumulative_oil),
            None => {
                return Err(EstimationFailure::InsufficientHistory {
                    required,
                    available: 0,
                })
            }
        };

        // Same record as a failed well's location, even after a dropped month
        let (x, y) = history.location();

        let results = self
            .models
            .iter()
            .filter_map(|model| match model.estimate(&fitted) {
                Ok(result) => Some(result),
                Err(e) => {
                    debug!(well = %history.well(), model = model.name(), error = %e, "Method skipped");
                    None
                }
            })
            .collect();

        Ok(PassEvaluation {
            pass,
            last_oil_rate,
            penultimate_oil_rate,
            cumulative_oil,
            elapsed_years: fitted.elapsed_years(),
            x,
            y,
            results,
        })
    }

    /// Select the accepted method with the largest residual reserves
    pub fn estimate(
        &self,
        history: &WellHistory,
        pass: EstimationPass,
    ) -> std::result::Result<WellReservesEstimate, EstimationFailure> {
        let evaluation = self.evaluate(history, pass)?;

        let positive: Vec<&MethodResult> = evaluation
            .results
            .iter()
            .filter(|r| r.residual_reserves > 0.0)
            .collect();
        if positive.is_empty() {
            return Err(EstimationFailure::NonPositiveResidual);
        }

        let threshold = self.constants.correlation_threshold;
        let correlated: Vec<&MethodResult> = positive
            .into_iter()
            .filter(|r| r.correlation > threshold || r.correlation < -threshold)
            .collect();
        if correlated.is_empty() {
            return Err(EstimationFailure::CorrelationOutOfBand);
        }

        let max_years = self.constants.max_forecast_years;
        let mut best: Option<&MethodResult> = None;
        let within_life = correlated
            .into_iter()
            .filter(|r| evaluation.forecast_life(r) < max_years);
        for result in within_life {
            // Strict comparison keeps the earlier method on ties
            if best.map_or(true, |b| result.residual_reserves > b.residual_reserves) {
                best = Some(result);
            }
        }
        let best = best.ok_or(EstimationFailure::ForecastOutOfRange)?;

        Ok(WellReservesEstimate {
            well: history.well().clone(),
            pass,
            method: best.method,
            ultimate_reserves: best.ultimate_reserves,
            residual_reserves: best.residual_reserves,
            correlation: best.correlation,
            determination: best.determination,
            last_oil_rate: evaluation.last_oil_rate,
            penultimate_oil_rate: evaluation.penultimate_oil_rate,
            cumulative_oil: evaluation.cumulative_oil,
            forecast_life_years: evaluation.forecast_life(best),
            elapsed_years: evaluation.elapsed_years,
            x: evaluation.x,
            y: evaluation.y,
        })
    }

    /// Last three points, dropping the latest if it collapsed against the
    /// month before. The penultimate rate is read before the drop.
    fn trim_tail(&self, well: &WellId, series: &CumulativeSeries) -> (CumulativeSeries, f64) {
        let tail = series.tail(3);
        let penultimate = tail.penultimate().map_or(0.0, |p| p.oil_rate);
        let last = tail.last().map_or(0.0, |p| p.oil_rate);

        if last < self.constants.spike_ratio * penultimate {
            debug!(%well, last, penultimate, "Dropping collapsed last month");
            (tail.without_last(), penultimate)
        } else {
            (tail, penultimate)
        }
    }
}

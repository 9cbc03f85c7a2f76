//! Field-wide reserves: direct estimates, clamping and spatial fallback
//!
//! A run has two phases. Phase one estimates every well from its own
//! history and freezes the accepted wells into a field map. Phase two
//! interpolates the wells that failed over that map. Both result sets are
//! clamped to the configured bounds and merged.

use crate::config::{EstimationConstants, ReservesBounds, ReservesConfig};
use crate::data::{WellHistory, WellId};
use crate::error::{EstimationFailure, ReservesError, Result};
use crate::selection::{EstimationPass, WellReservesEstimate, WellReservesSelector};
use crate::spatial::{FieldMap, InterpolationMethod, SpatialInterpolator};
use crate::utils::{
    apply_min_floor, clamp_to_life_bounds, forecast_life_years, rate_bounded_reserves,
    strictly_within, LifeClamp,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Flag of a fallback well whose nearest mapped neighbor is within range
pub const NEIGHBOR_WITHIN_RANGE: &str = "within limits";

/// Flag of a fallback well whose nearest mapped neighbor is too far away
pub fn no_usable_neighbor_flag(distance: f64) -> String {
    format!("! nearest well at distance {}", distance)
}

/// Divisor turning mass units into the reported thousands
pub const OUTPUT_SCALE: f64 = 1000.0;

/// A well estimated from its own history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectEstimateRow {
    pub well: WellId,
    pub pass: EstimationPass,
    pub method: String,
    pub ultimate_reserves: f64,
    /// Residual reserves as selected, before bounds
    pub raw_residual_reserves: f64,
    /// Residual reserves after the life bounds and the floor
    pub residual_reserves: f64,
    pub clamp: LifeClamp,
    pub correlation: f64,
    pub determination: f64,
    pub last_oil_rate: f64,
    pub penultimate_oil_rate: f64,
    pub cumulative_oil: f64,
    pub raw_forecast_life_years: f64,
    /// Remaining life implied by the clamped residual
    pub forecast_life_years: f64,
    pub elapsed_years: i32,
    pub x: f64,
    pub y: f64,
}

/// A well resolved from the field map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackEstimateRow {
    pub well: WellId,
    /// Why the well's own history was not used
    pub failure: String,
    pub x: f64,
    pub y: f64,
    pub nearest_distance: f64,
    pub flag: String,
    pub interpolation: InterpolationMethod,
    /// Interpolated ultimate reserves, NaN when unavailable
    pub first_candidate: f64,
    pub second_candidate: f64,
    pub cumulative_oil: f64,
    pub last_oil_rate: f64,
    pub penultimate_oil_rate: f64,
    pub residual_reserves: f64,
    /// Residual reserves plus cumulative oil
    pub ultimate_reserves: f64,
    pub clamp: LifeClamp,
}

/// Residual reserves per well in thousands of mass units
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateResult {
    values: BTreeMap<WellId, f64>,
}

impl AggregateResult {
    pub fn get(&self, well: &WellId) -> Option<f64> {
        self.values.get(well).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Wells and values in well-identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&WellId, f64)> + '_ {
        self.values.iter().map(|(well, value)| (well, *value))
    }

    /// Total residual reserves over all wells
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    fn insert(&mut self, well: WellId, residual_reserves: f64) {
        self.values.insert(well, residual_reserves / OUTPUT_SCALE);
    }
}

/// Outcome of an aggregation run
#[derive(Debug, Clone, PartialEq)]
pub struct ReservesReport {
    pub direct: Vec<DirectEstimateRow>,
    pub fallback: Vec<FallbackEstimateRow>,
    pub aggregate: AggregateResult,
}

/// Orchestrates reserves estimation over all wells of a field
#[derive(Debug, Clone)]
pub struct FieldReservesAggregator {
    bounds: ReservesBounds,
    constants: EstimationConstants,
    selector: WellReservesSelector,
}

impl FieldReservesAggregator {
    /// Create an aggregator from a validated configuration
    pub fn new(config: ReservesConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bounds: config.bounds,
            constants: config.constants,
            selector: WellReservesSelector::new(config.constants)?,
        })
    }

    /// Create an aggregator with the default constants
    pub fn with_bounds(bounds: ReservesBounds) -> Result<Self> {
        Self::new(ReservesConfig::with_bounds(bounds)?)
    }

    /// Estimate every well. Output does not depend on input order.
    pub fn run(&self, histories: &[WellHistory]) -> Result<ReservesReport> {
        let mut wells: BTreeMap<&WellId, &WellHistory> = BTreeMap::new();
        for history in histories {
            if wells.insert(history.well(), history).is_some() {
                return Err(ReservesError::DataError(format!(
                    "Well {} appears in more than one history",
                    history.well()
                )));
            }
        }

        // Phase one: each well from its own history
        let mut accepted: Vec<WellReservesEstimate> = Vec::new();
        let mut failed: Vec<(&WellHistory, EstimationFailure)> = Vec::new();
        for &history in wells.values() {
            match self.estimate_well(history) {
                Ok(estimate) => accepted.push(estimate),
                Err(failure) => failed.push((history, failure)),
            }
        }

        let field_map = FieldMap::from_estimates(&accepted);
        let direct: Vec<DirectEstimateRow> =
            accepted.iter().map(|e| self.clamp_direct(e)).collect();

        // Phase two: failed wells against the frozen map
        let interpolator = SpatialInterpolator::new(&field_map, self.constants.sparse_map_limit);
        let fallback: Vec<FallbackEstimateRow> = failed
            .iter()
            .map(|(history, failure)| self.resolve_fallback(history, *failure, &field_map, &interpolator))
            .collect();

        let mut aggregate = AggregateResult::default();
        for row in &direct {
            aggregate.insert(row.well.clone(), row.residual_reserves);
        }
        for row in &fallback {
            aggregate.insert(row.well.clone(), row.residual_reserves);
        }

        info!(
            wells = aggregate.len(),
            direct = direct.len(),
            fallback = fallback.len(),
            interpolation = ?interpolator.method(),
            total_thousands = aggregate.total(),
            "Reserves aggregation complete"
        );

        Ok(ReservesReport {
            direct,
            fallback,
            aggregate,
        })
    }

    /// All-points pass, retried on the last three points
    pub fn estimate_well(
        &self,
        history: &WellHistory,
    ) -> std::result::Result<WellReservesEstimate, EstimationFailure> {
        self.selector
            .estimate(history, EstimationPass::AllPoints)
            .or_else(|failure| {
                debug!(well = %history.well(), %failure, "All-points pass failed, retrying on last 3 points");
                self.selector.estimate(history, EstimationPass::LastThreePoints)
            })
            .map_err(|failure| {
                debug!(well = %history.well(), %failure, "Well routed to spatial fallback");
                failure
            })
    }

    /// Apply the life bounds and the floor to an accepted estimate
    pub fn clamp_direct(&self, estimate: &WellReservesEstimate) -> DirectEstimateRow {
        let (bounded, clamp) = clamp_to_life_bounds(
            estimate.residual_reserves,
            estimate.forecast_life_years,
            estimate.last_oil_rate,
            estimate.penultimate_oil_rate,
            &self.bounds,
            self.constants.rate_multiplier,
        );
        let (residual, clamp) = apply_min_floor(bounded, self.bounds.min_reserves, clamp);

        DirectEstimateRow {
            well: estimate.well.clone(),
            pass: estimate.pass,
            method: estimate.method.label().to_string(),
            ultimate_reserves: estimate.ultimate_reserves,
            raw_residual_reserves: estimate.residual_reserves,
            residual_reserves: residual,
            clamp,
            correlation: estimate.correlation,
            determination: estimate.determination,
            last_oil_rate: estimate.last_oil_rate,
            penultimate_oil_rate: estimate.penultimate_oil_rate,
            cumulative_oil: estimate.cumulative_oil,
            raw_forecast_life_years: estimate.forecast_life_years,
            forecast_life_years: forecast_life_years(residual, estimate.last_oil_rate),
            elapsed_years: estimate.elapsed_years,
            x: estimate.x,
            y: estimate.y,
        }
    }

    fn resolve_fallback(
        &self,
        history: &WellHistory,
        failure: EstimationFailure,
        field_map: &FieldMap,
        interpolator: &SpatialInterpolator,
    ) -> FallbackEstimateRow {
        let (x, y) = history.location();
        let nearest_distance = field_map.nearest_distance(x, y);
        let flag = if nearest_distance > self.bounds.max_neighbor_distance || field_map.is_empty() {
            warn!(well = %history.well(), distance = nearest_distance, "No usable neighbor within range");
            no_usable_neighbor_flag(nearest_distance)
        } else {
            NEIGHBOR_WITHIN_RANGE.to_string()
        };

        let cumulative_oil = history.cumulative_oil();
        let last_oil_rate = history.last_oil_rate();
        let penultimate_oil_rate = history.penultimate_oil_rate();

        let candidates = interpolator.interpolate(x, y);
        let positive: Vec<f64> = candidates
            .iter()
            .map(|ultimate| ultimate - cumulative_oil)
            .filter(|residual| *residual > 0.0)
            .collect();

        let life = |residual: f64| forecast_life_years(residual, last_oil_rate);
        let (bounded, clamp) = match positive.as_slice() {
            [] => (
                rate_bounded_reserves(
                    last_oil_rate,
                    penultimate_oil_rate,
                    self.bounds.year_min,
                    self.constants.rate_multiplier,
                ),
                LifeClamp::RaisedToYearMin,
            ),
            [only] => self.clamp_candidate(*only, last_oil_rate, penultimate_oil_rate),
            [first, second, ..] => {
                if strictly_within(life(*first), &self.bounds) {
                    (*first, LifeClamp::Unchanged)
                } else if strictly_within(life(*second), &self.bounds) {
                    (*second, LifeClamp::Unchanged)
                } else {
                    self.clamp_candidate(*first, last_oil_rate, penultimate_oil_rate)
                }
            }
        };
        let (residual_reserves, clamp) = apply_min_floor(bounded, self.bounds.min_reserves, clamp);

        debug!(
            well = %history.well(),
            candidates = positive.len(),
            residual = residual_reserves,
            "Fallback resolved"
        );

        FallbackEstimateRow {
            well: history.well().clone(),
            failure: failure.to_string(),
            x,
            y,
            nearest_distance,
            flag,
            interpolation: candidates.method,
            first_candidate: candidates.values[0],
            second_candidate: candidates.values[1],
            cumulative_oil,
            last_oil_rate,
            penultimate_oil_rate,
            residual_reserves,
            ultimate_reserves: residual_reserves + cumulative_oil,
            clamp,
        }
    }

    fn clamp_candidate(&self, residual: f64, last_oil_rate: f64, penultimate_oil_rate: f64) -> (f64, LifeClamp) {
        clamp_to_life_bounds(
            residual,
            forecast_life_years(residual, last_oil_rate),
            last_oil_rate,
            penultimate_oil_rate,
            &self.bounds,
            self.constants.rate_multiplier,
        )
    }
}

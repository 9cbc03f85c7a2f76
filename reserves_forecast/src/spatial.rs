//! Field map of accepted wells and interpolation over it

use crate::data::WellId;
use crate::selection::WellReservesEstimate;
use reserves_math::{
    BicubicSurface, CubicTinInterpolator, LinearTinInterpolator, ScatterPoint,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Location and ultimate reserves of an accepted well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPoint {
    pub well: WellId,
    pub x: f64,
    pub y: f64,
    pub ultimate_reserves: f64,
}

/// Snapshot of accepted wells, frozen once built
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    points: Vec<FieldPoint>,
}

impl FieldMap {
    pub fn new(points: Vec<FieldPoint>) -> Self {
        Self { points }
    }

    /// Map of the unclamped ultimate reserves of accepted estimates
    pub fn from_estimates<'a>(estimates: impl IntoIterator<Item = &'a WellReservesEstimate>) -> Self {
        let points = estimates
            .into_iter()
            .map(|e| FieldPoint {
                well: e.well.clone(),
                x: e.x,
                y: e.y,
                ultimate_reserves: e.ultimate_reserves,
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[FieldPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance to the closest mapped well, infinite for an empty map
    pub fn nearest_distance(&self, x: f64, y: f64) -> f64 {
        self.points
            .iter()
            .map(|p| (p.x - x).hypot(p.y - y))
            .fold(f64::INFINITY, f64::min)
    }

    fn scatter(&self) -> Vec<ScatterPoint> {
        self.points
            .iter()
            .map(|p| ScatterPoint::new(p.x, p.y, p.ultimate_reserves))
            .collect()
    }
}

/// Strategy used for a field map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpolationMethod {
    /// Piecewise-linear over the triangulation; one value reported twice
    PiecewiseLinear,
    /// Triangulated cubic and least-squares bicubic
    DualCubic,
}

/// Two interpolated ultimate-reserves values at a location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationCandidates {
    pub method: InterpolationMethod,
    pub values: [f64; 2],
}

impl InterpolationCandidates {
    /// Candidate values in preference order
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Whether neither candidate is a number
    pub fn is_unusable(&self) -> bool {
        self.values.iter().all(|v| !v.is_finite())
    }
}

#[derive(Debug, Clone)]
enum Strategy {
    Sparse(LinearTinInterpolator),
    Dense {
        cubic: CubicTinInterpolator,
        bicubic: Option<BicubicSurface>,
    },
}

/// Interpolator prepared once for a field map
#[derive(Debug, Clone)]
pub struct SpatialInterpolator {
    strategy: Strategy,
}

impl SpatialInterpolator {
    /// Prepare the interpolants; maps with at most `sparse_map_limit`
    /// points use the piecewise-linear strategy
    pub fn new(map: &FieldMap, sparse_map_limit: usize) -> Self {
        let scatter = map.scatter();

        let strategy = if scatter.len() <= sparse_map_limit {
            Strategy::Sparse(LinearTinInterpolator::new(&scatter))
        } else {
            let bicubic = match BicubicSurface::fit(&scatter) {
                Ok(surface) => Some(surface),
                Err(e) => {
                    warn!(points = scatter.len(), error = %e, "Bicubic surface unavailable");
                    None
                }
            };
            Strategy::Dense {
                cubic: CubicTinInterpolator::new(&scatter),
                bicubic,
            }
        };

        Self { strategy }
    }

    /// Strategy selected for the map
    pub fn method(&self) -> InterpolationMethod {
        match self.strategy {
            Strategy::Sparse(_) => InterpolationMethod::PiecewiseLinear,
            Strategy::Dense { .. } => InterpolationMethod::DualCubic,
        }
    }

    /// Interpolated ultimate reserves at `(x, y)`; NaN marks a candidate
    /// with no usable value
    pub fn interpolate(&self, x: f64, y: f64) -> InterpolationCandidates {
        let values = match &self.strategy {
            Strategy::Sparse(linear) => {
                let value = linear.interpolate(x, y);
                [value, value]
            }
            Strategy::Dense { cubic, bicubic } => [
                cubic.interpolate(x, y),
                bicubic.as_ref().map_or(f64::NAN, |s| s.evaluate(x, y)),
            ],
        };

        InterpolationCandidates {
            method: self.method(),
            values,
        }
    }
}

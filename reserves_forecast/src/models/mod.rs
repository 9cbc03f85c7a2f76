//! Decline-curve models that turn a cumulative production series into
//! recoverable reserves

use crate::data::CumulativeSeries;
use serde::{Deserialize, Serialize};

pub mod decline_method;
pub mod linear_decline;

pub use decline_method::DeclineMethod;
pub use linear_decline::LinearDeclineModel;

/// Outcome of one decline method on one well
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    /// Method that produced the result
    pub method: DeclineMethod,
    /// Ultimate recoverable reserves, mass units
    pub ultimate_reserves: f64,
    /// Ultimate reserves minus cumulative oil produced so far
    pub residual_reserves: f64,
    /// Magnitude of the water-cut correlation of the fitted points
    pub correlation: f64,
    /// Coefficient of determination of the method's own fit
    pub determination: f64,
    /// Fitted slope before taking its magnitude
    pub slope: f64,
    /// Fitted intercept
    pub intercept: f64,
}

impl MethodResult {
    /// Whether the fit had no slope to invert
    pub fn is_degenerate(&self) -> bool {
        self.slope == 0.0
    }
}

/// Something that can estimate reserves from a cumulative series
pub trait ReservesModel {
    /// Fit the model and invert the fit to reserves
    fn estimate(&self, series: &CumulativeSeries) -> crate::error::Result<MethodResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

//! Error types for the reserves_forecast crate
//!
//! `ReservesError` covers failures at the edges of the pipeline (bad input,
//! bad configuration, IO). Per-well estimation problems are not errors: they
//! are reported as `EstimationFailure` values and routed to the spatial
//! fallback.

use polars::prelude::PolarsError;
use reserves_math::MathError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Custom error types for the reserves_forecast crate
#[derive(Debug, Error)]
pub enum ReservesError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from configuration loading
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from CSV report writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON report writing
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ReservesError>;

impl From<PolarsError> for ReservesError {
    fn from(err: PolarsError) -> Self {
        ReservesError::PolarsError(err.to_string())
    }
}

impl From<toml::de::Error> for ReservesError {
    fn from(err: toml::de::Error) -> Self {
        ReservesError::ConfigError(err.to_string())
    }
}

/// Why a well's own history did not yield an accepted estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EstimationFailure {
    /// Fewer history points than the pass needs
    InsufficientHistory { required: usize, available: usize },
    /// Every method forecast non-positive residual reserves
    NonPositiveResidual,
    /// No method's correlation magnitude exceeded the acceptance band
    CorrelationOutOfBand,
    /// Every remaining method forecast too long a remaining life
    ForecastOutOfRange,
}

impl fmt::Display for EstimationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimationFailure::InsufficientHistory {
                required,
                available,
            } => write!(
                f,
                "insufficient history: {available} point(s) available, {required} required"
            ),
            EstimationFailure::NonPositiveResidual => write!(f, "residual reserves <= 0"),
            EstimationFailure::CorrelationOutOfBand => write!(f, "correlation out of band"),
            EstimationFailure::ForecastOutOfRange => {
                write!(f, "forecast remaining life exceeds the limit")
            }
        }
    }
}

//! # Reserves Math
//!
//! Numerical building blocks for decline-curve reserves estimation.
//! This crate provides ordinary least squares, correlation statistics,
//! a small dense linear solver and scattered-data interpolation over
//! irregular well locations.

use thiserror::Error;

pub mod interpolation;
pub mod linalg;
pub mod regression;
pub mod statistics;
pub mod triangulation;

pub use interpolation::{BicubicSurface, CubicTinInterpolator, LinearTinInterpolator};
pub use regression::{LinearFit, LinearRegression};
pub use statistics::pearson_correlation;
pub use triangulation::{ScatterPoint, Triangle, Triangulation};

/// Errors that can occur in reserves-related numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Singular system: {0}")]
    SingularSystem(String),
}

/// Result type for reserves math operations
pub type Result<T> = std::result::Result<T, MathError>;

//! # Reserves Forecast
//!
//! Per-well residual recoverable oil reserves from monthly production
//! history, with a spatial fallback for wells whose history does not
//! support a reliable estimate.
//!
//! ## Features
//!
//! - Cleaned history loading from CSV (`polars`)
//! - Five decline-curve linearizations (methods A to E)
//! - Acceptance rules and best-method selection, over all points and over
//!   the last three points
//! - Life-bound clamping and a minimum-reserves floor
//! - Interpolation of failed wells over the map of accepted wells
//! - CSV and JSON output tables
//! - Monthly oil and liquid profiles from a liquid decline and a
//!   desaturation characteristic
//!
//! ## Quick Start
//!
//! ```no_run
//! use reserves_forecast::config::ReservesBounds;
//! use reserves_forecast::data::DataLoader;
//! use reserves_forecast::aggregation::FieldReservesAggregator;
//!
//! # fn main() -> reserves_forecast::error::Result<()> {
//! // Load cleaned histories
//! let histories = DataLoader::from_csv("history.csv")?;
//!
//! // Minimum reserves, neighbor distance, shortest and longest remaining life
//! let bounds = ReservesBounds::new(2000.0, 1000.0, 5.0, 50.0)?;
//! let aggregator = FieldReservesAggregator::with_bounds(bounds)?;
//!
//! let report = aggregator.run(&histories)?;
//! for (well, thousands) in report.aggregate.iter() {
//!     println!("{well}: {thousands:.3}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod profile;
pub mod report;
pub mod selection;
pub mod spatial;
pub mod utils;

// Re-export commonly used types
pub use crate::aggregation::{AggregateResult, FieldReservesAggregator, ReservesReport};
pub use crate::config::{EstimationConstants, ReservesBounds, ReservesConfig};
pub use crate::data::{DataLoader, ProductionRecord, WellHistory, WellId};
pub use crate::error::{EstimationFailure, ReservesError};
pub use crate::models::{DeclineMethod, LinearDeclineModel, MethodResult};
pub use crate::profile::{fluid_production_profile, DesaturationCharacteristic, LiquidDecline, ProductionProfile};
pub use crate::selection::{EstimationPass, WellReservesEstimate, WellReservesSelector};
pub use crate::spatial::{FieldMap, SpatialInterpolator};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

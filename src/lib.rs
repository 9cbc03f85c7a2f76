//! # Well Reserves
//!
//! Umbrella crate for the reserves workspace: `reserves_math` holds the
//! numerical primitives, `reserves_forecast` the estimation pipeline.
//!
//! ## Example
//!
//! ```
//! use well_reserves_workspace::{DeclineMethod, LinearDeclineModel};
//!
//! let model = LinearDeclineModel::new(DeclineMethod::Fractional, 0.99).unwrap();
//! assert_eq!(model.method().label(), "C");
//! ```

pub use reserves_forecast;
pub use reserves_math;

pub use reserves_forecast::{
    AggregateResult, DataLoader, DeclineMethod, EstimationConstants, EstimationFailure,
    FieldReservesAggregator, LinearDeclineModel, ReservesBounds, ReservesConfig, ReservesError,
    ReservesReport, WellHistory, WellId,
};
pub use reserves_math::{LinearRegression, MathError, ScatterPoint};

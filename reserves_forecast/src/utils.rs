//! Rate and life helpers shared by the direct and fallback paths

use crate::config::ReservesBounds;
use serde::{Deserialize, Serialize};

/// Months in a year, for annualizing a monthly rate
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Remaining life in years at the current monthly oil rate
pub fn forecast_life_years(residual_reserves: f64, last_oil_rate: f64) -> f64 {
    residual_reserves / (last_oil_rate * MONTHS_PER_YEAR)
}

/// Residual reserves implied by producing for `years` at the mean of the
/// last two monthly rates, `multiplier` being half the months in a year
pub fn rate_bounded_reserves(
    last_oil_rate: f64,
    penultimate_oil_rate: f64,
    years: f64,
    multiplier: f64,
) -> f64 {
    (last_oil_rate + penultimate_oil_rate) * years * multiplier
}

/// Which life bound, if any, replaced a residual value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeClamp {
    Unchanged,
    CappedAtYearMax,
    RaisedToYearMin,
    FlooredAtMinReserves,
}

/// Replace a residual whose life falls strictly outside the bounds with the
/// rate-bounded value at the violated bound
pub fn clamp_to_life_bounds(
    residual_reserves: f64,
    life_years: f64,
    last_oil_rate: f64,
    penultimate_oil_rate: f64,
    bounds: &ReservesBounds,
    multiplier: f64,
) -> (f64, LifeClamp) {
    if life_years > bounds.year_max {
        (
            rate_bounded_reserves(last_oil_rate, penultimate_oil_rate, bounds.year_max, multiplier),
            LifeClamp::CappedAtYearMax,
        )
    } else if life_years < bounds.year_min {
        (
            rate_bounded_reserves(last_oil_rate, penultimate_oil_rate, bounds.year_min, multiplier),
            LifeClamp::RaisedToYearMin,
        )
    } else {
        (residual_reserves, LifeClamp::Unchanged)
    }
}

/// Raise a value below the floor to the floor
pub fn apply_min_floor(value: f64, min_reserves: f64, clamp: LifeClamp) -> (f64, LifeClamp) {
    if value < min_reserves {
        (min_reserves, LifeClamp::FlooredAtMinReserves)
    } else {
        (value, clamp)
    }
}

/// Whether a life lies strictly between the two bounds
pub fn strictly_within(life_years: f64, bounds: &ReservesBounds) -> bool {
    life_years > bounds.year_min && life_years < bounds.year_max
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds() -> ReservesBounds {
        ReservesBounds::new(0.0, 1000.0, 5.0, 50.0).unwrap()
    }

    #[test]
    fn test_forecast_life() {
        assert_relative_eq!(forecast_life_years(6975.0, 150.0), 3.875);
    }

    #[test]
    fn test_life_exactly_at_bound_is_unchanged() {
        let (value, clamp) = clamp_to_life_bounds(3000.0, 50.0, 5.0, 5.0, &bounds(), 6.0);
        assert_eq!(value, 3000.0);
        assert_eq!(clamp, LifeClamp::Unchanged);

        let (value, clamp) = clamp_to_life_bounds(300.0, 5.0, 5.0, 5.0, &bounds(), 6.0);
        assert_eq!(value, 300.0);
        assert_eq!(clamp, LifeClamp::Unchanged);
    }

    #[test]
    fn test_life_outside_bounds_is_clamped() {
        let (value, clamp) = clamp_to_life_bounds(100_000.0, 80.0, 10.0, 20.0, &bounds(), 6.0);
        assert_relative_eq!(value, 30.0 * 50.0 * 6.0);
        assert_eq!(clamp, LifeClamp::CappedAtYearMax);

        let (value, clamp) = clamp_to_life_bounds(10.0, 0.5, 10.0, 20.0, &bounds(), 6.0);
        assert_relative_eq!(value, 30.0 * 5.0 * 6.0);
        assert_eq!(clamp, LifeClamp::RaisedToYearMin);
    }

    #[test]
    fn test_min_floor() {
        assert_eq!(
            apply_min_floor(900.0, 2000.0, LifeClamp::RaisedToYearMin),
            (2000.0, LifeClamp::FlooredAtMinReserves)
        );
        assert_eq!(
            apply_min_floor(2000.0, 2000.0, LifeClamp::Unchanged),
            (2000.0, LifeClamp::Unchanged)
        );
    }
}

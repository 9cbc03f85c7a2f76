//! Sample statistics used by the reserves acceptance criteria

use statrs::statistics::Statistics;

/// Sample Pearson correlation coefficient between two series.
///
/// Returns NaN when the series differ in length, have fewer than two
/// points, or when either series is constant. A NaN coefficient fails any
/// acceptance band it is compared against.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }

    let covariance = x.iter().covariance(y.iter());
    let x_std = x.iter().std_dev();
    let y_std = y.iter().std_dev();

    let denominator = x_std * y_std;
    if denominator == 0.0 || !denominator.is_finite() {
        return f64::NAN;
    }

    (covariance / denominator).clamp(-1.0, 1.0)
}

/// Arithmetic mean, NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

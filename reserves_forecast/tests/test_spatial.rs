use approx::assert_relative_eq;
use reserves_forecast::data::WellId;
use reserves_forecast::spatial::{FieldMap, FieldPoint, InterpolationMethod, SpatialInterpolator};

fn linear_field(x: f64, y: f64) -> f64 {
    10.0 + x + 2.0 * y
}

/// Scattered wells on a jittered grid, columns filled first
fn field_map(count: usize) -> FieldMap {
    let mut points = Vec::new();
    for i in 0..5 {
        for j in 0..4 {
            let x = i as f64 * 100.0 + ((i * 7 + j * 3) % 5) as f64 * 9.7;
            let y = j as f64 * 120.0 + ((i * 2 + j * 5) % 7) as f64 * 6.1;
            points.push(FieldPoint {
                well: WellId::new(format!("W{}", i * 4 + j)),
                x,
                y,
                ultimate_reserves: linear_field(x, y),
            });
        }
    }
    points.truncate(count);
    FieldMap::new(points)
}

#[test]
fn test_sixteen_points_use_piecewise_linear() {
    let interpolator = SpatialInterpolator::new(&field_map(16), 16);
    let candidates = interpolator.interpolate(150.0, 180.0);

    assert_eq!(candidates.method, InterpolationMethod::PiecewiseLinear);
    assert_eq!(candidates.values[0], candidates.values[1]);
    assert_relative_eq!(candidates.values[0], linear_field(150.0, 180.0), max_relative = 1e-9);
}

#[test]
fn test_seventeen_points_use_two_estimates() {
    let interpolator = SpatialInterpolator::new(&field_map(17), 16);
    let candidates = interpolator.interpolate(150.0, 180.0);

    assert_eq!(candidates.method, InterpolationMethod::DualCubic);
    assert_relative_eq!(candidates.values[0], linear_field(150.0, 180.0), max_relative = 1e-6);
    assert_relative_eq!(candidates.values[1], linear_field(150.0, 180.0), max_relative = 1e-6);
}

#[test]
fn test_outside_hull_is_not_usable() {
    let sparse = SpatialInterpolator::new(&field_map(8), 16);
    assert!(sparse.interpolate(-1000.0, -1000.0).is_unusable());

    // The bicubic surface still extrapolates
    let dense = SpatialInterpolator::new(&field_map(20), 16);
    let candidates = dense.interpolate(-1000.0, -1000.0);
    assert!(candidates.values[0].is_nan());
    assert!(candidates.values[1].is_finite());
    assert!(!candidates.is_unusable());
}

#[test]
fn test_degenerate_maps() {
    let empty = FieldMap::default();
    assert!(empty.is_empty());
    assert_eq!(empty.nearest_distance(0.0, 0.0), f64::INFINITY);
    assert!(SpatialInterpolator::new(&empty, 16).interpolate(0.0, 0.0).is_unusable());

    let two = field_map(2);
    assert!(SpatialInterpolator::new(&two, 16).interpolate(0.0, 60.0).is_unusable());
}

#[test]
fn test_nearest_distance() {
    let map = FieldMap::new(vec![
        FieldPoint {
            well: WellId::new("A"),
            x: 0.0,
            y: 0.0,
            ultimate_reserves: 1.0,
        },
        FieldPoint {
            well: WellId::new("B"),
            x: 100.0,
            y: 0.0,
            ultimate_reserves: 1.0,
        },
    ]);

    assert_relative_eq!(map.nearest_distance(30.0, 40.0), 50.0);
    assert_relative_eq!(map.nearest_distance(100.0, 10.0), 10.0);
    assert_eq!(map.len(), 2);
}

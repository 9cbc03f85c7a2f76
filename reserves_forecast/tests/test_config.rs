use pretty_assertions::assert_eq;
use reserves_forecast::config::{EstimationConstants, ReservesBounds, ReservesConfig};
use reserves_forecast::error::ReservesError;
use std::io::Write;
use tempfile::NamedTempFile;

const FULL: &str = r#"
[bounds]
min_reserves = 2000.0
max_neighbor_distance = 1000.0
year_min = 5.0
year_max = 50.0

[constants]
spike_ratio = 0.3
sparse_map_limit = 10
"#;

#[test]
fn test_constants_defaults() {
    let constants = EstimationConstants::default();
    assert_eq!(constants.recovery_fraction, 0.99);
    assert_eq!(constants.correlation_threshold, 0.7);
    assert_eq!(constants.max_forecast_years, 50.0);
    assert_eq!(constants.spike_ratio, 0.25);
    assert_eq!(constants.rate_multiplier, 6.0);
    assert_eq!(constants.sparse_map_limit, 16);
    assert!(constants.validate().is_ok());
}

#[test]
fn test_partial_constants_override() {
    let config = ReservesConfig::from_toml_str(FULL).unwrap();

    assert_eq!(
        config.bounds,
        ReservesBounds::new(2000.0, 1000.0, 5.0, 50.0).unwrap()
    );
    assert_eq!(config.constants.spike_ratio, 0.3);
    assert_eq!(config.constants.sparse_map_limit, 10);
    assert_eq!(config.constants.recovery_fraction, 0.99);
}

#[test]
fn test_constants_section_is_optional() {
    let toml = r#"
[bounds]
min_reserves = 0.0
max_neighbor_distance = 500.0
year_min = 1.0
year_max = 30.0
"#;
    let config = ReservesConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.constants, EstimationConstants::default());
}

#[test]
fn test_bounds_are_required() {
    let toml = r#"
[bounds]
min_reserves = 0.0
year_min = 1.0
year_max = 30.0
"#;
    assert!(matches!(
        ReservesConfig::from_toml_str(toml),
        Err(ReservesError::ConfigError(_))
    ));
}

#[test]
fn test_invalid_values_rejected() {
    let inverted = FULL.replace("year_min = 5.0", "year_min = 80.0");
    assert!(matches!(
        ReservesConfig::from_toml_str(&inverted),
        Err(ReservesError::InvalidParameter(_))
    ));

    let bad_recovery = format!("{}recovery_fraction = 1.0\n", FULL);
    assert!(ReservesConfig::from_toml_str(&bad_recovery).is_err());
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", FULL).unwrap();

    let config = ReservesConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.bounds.year_min, 5.0);

    assert!(matches!(
        ReservesConfig::load_from_file("/nonexistent/reserves.toml"),
        Err(ReservesError::ConfigError(_))
    ));
}

#[test]
fn test_toml_round_trip() {
    let config = ReservesConfig::with_bounds(ReservesBounds::new(10.0, 20.0, 1.0, 2.0).unwrap()).unwrap();
    let text = toml::to_string(&config).unwrap();
    assert_eq!(ReservesConfig::from_toml_str(&text).unwrap(), config);
}

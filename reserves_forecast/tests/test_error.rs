use reserves_forecast::error::{EstimationFailure, ReservesError};
use reserves_math::MathError;
use std::io;

#[test]
fn test_error_conversion() {
    // Test IO error conversion
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let error = ReservesError::from(io_error);
    assert!(matches!(error, ReservesError::IoError(_)));

    // Test math error conversion
    let math_error = MathError::SingularSystem("pivot vanished".to_string());
    let error = ReservesError::from(math_error.clone());
    match error {
        ReservesError::MathError(inner) => assert_eq!(inner, math_error),
        _ => panic!("Expected MathError variant"),
    }

    // Test TOML error conversion
    let toml_error = toml::from_str::<toml::Table>("bounds = [").unwrap_err();
    let error = ReservesError::from(toml_error);
    assert!(matches!(error, ReservesError::ConfigError(_)));
}

#[test]
fn test_error_display() {
    let error = ReservesError::InvalidParameter("year_min must not exceed year_max".to_string());
    let error_string = format!("{}", error);
    assert!(error_string.contains("Invalid parameter"));
    assert!(error_string.contains("year_min must not exceed year_max"));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ReservesError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}

#[test]
fn test_estimation_failure_display() {
    let insufficient = EstimationFailure::InsufficientHistory {
        required: 3,
        available: 2,
    };
    assert_eq!(
        insufficient.to_string(),
        "insufficient history: 2 point(s) available, 3 required"
    );
    assert_eq!(
        EstimationFailure::NonPositiveResidual.to_string(),
        "residual reserves <= 0"
    );
    assert_eq!(
        EstimationFailure::CorrelationOutOfBand.to_string(),
        "correlation out of band"
    );
    assert!(EstimationFailure::ForecastOutOfRange
        .to_string()
        .contains("remaining life"));
}

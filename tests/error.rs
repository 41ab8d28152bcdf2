//! Tests for error types

use trackkit::TrackError;

#[test]
fn test_parse_error_display() {
    let err = TrackError::parse("gpx", "missing root element");
    assert_eq!(err.to_string(), "parse error (gpx): missing root element");
}

#[test]
fn test_schema_error_display() {
    let err = TrackError::Schema {
        schema: "gpx/1.1",
        element: "trkpt@lat".to_string(),
        constraint: "required attribute missing".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "schema violation (gpx/1.1): <trkpt@lat>: required attribute missing"
    );
}

#[test]
fn test_unsupported_error_display() {
    let err = TrackError::Unsupported {
        operation: "encode to FIT",
        reason: "FIT is a decode-only format in this crate".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "unsupported operation: encode to FIT (FIT is a decode-only format in this crate)"
    );
}

#[test]
fn test_missing_data_error_display() {
    let err = TrackError::MissingData {
        field: "elevation",
        operation: "ascent",
    };
    assert_eq!(
        err.to_string(),
        "no point in the document carries elevation data, required by ascent"
    );
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: TrackError = io.into();
    assert!(matches!(err, TrackError::Io(_)));
    assert!(err.to_string().contains("gone"));
}

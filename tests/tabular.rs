//! Tests for tabular projection and CSV export

use chrono::{Duration, TimeZone, Utc};
use trackkit::formats::csv_export::to_csv;
use trackkit::tabular::project;
use trackkit::{Field, Gpx, GpxVersion, Point, Segment, Track, Value};

fn sample_document() -> Gpx {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let mut a = Point::with_time(51.0, 0.0, t0);
    a.elevation = Some(100.0);
    let b = Point::with_time(51.0009, 0.0, t0 + Duration::seconds(36));
    // b has no elevation on purpose

    let mut document = Gpx::new(GpxVersion::V1_1, "test");
    document.tracks.push(Track {
        name: None,
        track_type: None,
        segments: vec![Segment::from_points(vec![a, b])],
    });
    document
}

#[test]
fn test_field_names() {
    assert_eq!(Field::Latitude.name(), "lat");
    assert_eq!(Field::Longitude.name(), "lon");
    assert_eq!(Field::Elevation.name(), "ele");
    assert_eq!(Field::Time.name(), "time");
    assert_eq!(Field::DistanceFromPrevious.name(), "distance");
    assert_eq!(Field::Speed.name(), "speed");
    assert_eq!(Field::Pace.name(), "pace");
    assert_eq!(Field::AscentRate.name(), "ascent_rate");
    assert_eq!(Field::AscentSpeed.name(), "ascent_speed");
    assert_eq!(Field::all().len(), 9);
}

#[test]
fn test_project_one_row_per_point() {
    let document = sample_document();
    let table = project(&document, &[Field::Latitude, Field::Elevation]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.fields(), &[Field::Latitude, Field::Elevation]);

    let lats = table.column(Field::Latitude).unwrap();
    assert_eq!(lats[0].as_float(), Some(51.0));
    assert_eq!(lats[1].as_float(), Some(51.0009));
}

#[test]
fn test_project_missing_values_are_null() {
    let document = sample_document();
    let table = project(&document, &[Field::Elevation, Field::Speed]);

    let elevations = table.column(Field::Elevation).unwrap();
    assert_eq!(elevations[0].as_float(), Some(100.0));
    assert!(elevations[1].is_null());

    // Speed has not been computed, so the whole column is null
    let speeds = table.column(Field::Speed).unwrap();
    assert!(speeds.iter().all(Value::is_null));
}

#[test]
fn test_project_derived_fields_after_computation() {
    let mut document = sample_document();
    document.compute_points_speed();
    let table = project(&document, &[Field::Speed]);
    let speeds = table.column(Field::Speed).unwrap();
    // First point has no predecessor; second does
    assert!(speeds[0].is_null());
    assert!(speeds[1].as_float().unwrap() > 0.0);
}

#[test]
fn test_column_not_projected() {
    let document = sample_document();
    let table = project(&document, &[Field::Latitude]);
    assert!(table.column(Field::Elevation).is_none());
}

#[test]
fn test_rows_iterate_in_field_order() {
    let document = sample_document();
    let table = project(&document, &[Field::Latitude, Field::Longitude]);
    let rows: Vec<Vec<Value>> = table.rows().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0].as_float(), Some(51.0));
    assert_eq!(rows[0][1].as_float(), Some(0.0));
}

#[test]
fn test_to_csv_with_header() {
    let document = sample_document();
    let csv = to_csv(
        &document,
        &[Field::Latitude, Field::Longitude, Field::Elevation],
        true,
    )
    .unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("lat,lon,ele"));
    assert_eq!(lines.next(), Some("51,0,100"));
    // Missing elevation becomes an empty cell
    assert_eq!(lines.next(), Some("51.0009,0,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_to_csv_without_header() {
    let document = sample_document();
    let csv = to_csv(&document, &[Field::Latitude], false).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.starts_with("51"));
}

#[test]
fn test_to_csv_time_column() {
    let document = sample_document();
    let csv = to_csv(&document, &[Field::Time], false).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("2024-05-01T10:00:00Z"));
    assert_eq!(lines.next(), Some("2024-05-01T10:00:36Z"));
}

#[test]
fn test_empty_document_projects_empty_table() {
    let document = Gpx::new(GpxVersion::V1_1, "test");
    let table = project(&document, &[Field::Latitude]);
    assert_eq!(table.row_count(), 0);
    let csv = to_csv(&document, &[Field::Latitude], true).unwrap();
    assert_eq!(csv.lines().count(), 1);
}

//! End-to-end pipeline tests

use trackkit::formats::csv_export::to_csv;
use trackkit::{decode, encode, DecodeOptions, Field, Format, Gpx};

const RECORDING: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="integration-test" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><name>Loop</name></metadata>
  <trk>
    <name>Loop</name>
    <trkseg>
      <trkpt lat="51.0000" lon="0.0000"><ele>100.0</ele><time>2024-05-01T10:00:00Z</time></trkpt>
      <trkpt lat="51.0009" lon="0.0000"><ele>105.0</ele><time>2024-05-01T10:00:36Z</time></trkpt>
      <trkpt lat="51.0018" lon="0.0000"><ele>103.0</ele><time>2024-05-01T10:01:12Z</time></trkpt>
      <trkpt lat="51.0027" lon="0.0000"><ele>108.0</ele><time>2024-05-01T10:01:48Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_decode_analyze_encode_pipeline() {
    init_logging();
    let mut document: Gpx = decode(RECORDING, &DecodeOptions::default()).unwrap();
    assert_eq!(document.name(), Some("Loop"));
    assert_eq!(document.point_count(), 4);

    // ~300 m in 108 s at a steady ~10 km/h
    let distance = document.distance();
    assert!((distance - 300.0).abs() < 5.0);
    let avg = document.avg_speed().unwrap();
    assert!((avg - 10.0).abs() < 0.5);

    let ascent = document.ascent().unwrap();
    let descent = document.descent().unwrap();
    assert_eq!(ascent, 10.0);
    assert_eq!(descent, 2.0);

    let encoded = encode(&document, Format::Gpx).unwrap();
    let reparsed = decode(&encoded, &DecodeOptions::default()).unwrap();
    assert_eq!(reparsed.point_count(), 4);
}

#[test]
fn test_simplify_then_reanalyze() {
    let mut document = decode(RECORDING, &DecodeOptions::default()).unwrap();
    let before = document.distance();

    document.simplify_with(1000.0);
    assert_eq!(document.point_count(), 2);

    // Aggregates recompute against the new geometry
    let after = document.distance();
    assert!(after <= before);
    assert!(after > 0.0);
}

#[test]
fn test_convert_gpx_to_kml_and_csv() {
    let document = decode(RECORDING, &DecodeOptions::default()).unwrap();

    let kml = String::from_utf8(encode(&document, Format::Kml).unwrap()).unwrap();
    assert!(kml.contains("<LineString>"));
    assert!(kml.contains("<name>Loop</name>"));

    let csv = to_csv(&document, &[Field::Latitude, Field::Longitude, Field::Elevation], true)
        .unwrap();
    assert_eq!(csv.lines().count(), 5);
}

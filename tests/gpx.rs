//! Tests for the GPX codec

use trackkit::{decode_as, encode, DecodeOptions, Format, GpxVersion, TrackError};

const SAMPLE: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test-device" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata>
    <name>Morning Run</name>
  </metadata>
  <wpt lat="51.50740" lon="-0.12780">
    <ele>11.0</ele>
    <name>Start</name>
  </wpt>
  <trk>
    <name>Morning Run</name>
    <trkseg>
      <trkpt lat="51.50740" lon="-0.12780">
        <ele>11.0</ele>
        <time>2024-05-01T10:00:00Z</time>
      </trkpt>
      <trkpt lat="51.50830" lon="-0.12900">
        <ele>12.5</ele>
        <time>2024-05-01T10:00:36Z</time>
      </trkpt>
    </trkseg>
  </trk>
</gpx>"#;

fn decode_sample() -> trackkit::Gpx {
    decode_as(SAMPLE, Format::Gpx, &DecodeOptions::default()).unwrap()
}

#[test]
fn test_decode_basic_document() {
    let document = decode_sample();
    assert_eq!(document.version, GpxVersion::V1_1);
    assert_eq!(document.creator, "test-device");
    assert_eq!(document.name(), Some("Morning Run"));
    assert_eq!(document.waypoints.len(), 1);
    assert_eq!(document.point_count(), 2);

    let first = document.first_point().unwrap();
    assert_eq!(first.latitude, 51.5074);
    assert_eq!(first.longitude, -0.1278);
    assert_eq!(first.elevation, Some(11.0));
    assert!(first.time.is_some());
}

#[test]
fn test_decode_records_precision() {
    let document = decode_sample();
    // Coordinates carry 5 decimal places, elevations 1
    assert_eq!(document.precision.lat_lon, 5);
    assert_eq!(document.precision.elevation, 1);
}

#[test]
fn test_decode_fractional_time_format() {
    let xml = br#"<?xml version="1.0"?>
<gpx version="1.1" creator="t" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="51.0" lon="0.0"><time>2024-05-01T10:00:00.500Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;
    let document = decode_as(xml, Format::Gpx, &DecodeOptions::default()).unwrap();
    assert_eq!(document.precision.time, trackkit::TimeFormat::Fractional);
}

#[test]
fn test_missing_version_is_parse_error() {
    let xml = br#"<?xml version="1.0"?>
<gpx creator="t" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg><trkpt lat="51.0" lon="0.0"/></trkseg></trk>
</gpx>"#;
    let err = decode_as(xml, Format::Gpx, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, TrackError::Parse { format: "gpx", .. }));
}

#[test]
fn test_missing_creator_is_parse_error() {
    let xml = br#"<?xml version="1.0"?>
<gpx version="1.1" xmlns="http://www.topografix.com/GPX/1/1">
</gpx>"#;
    let err = decode_as(xml, Format::Gpx, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, TrackError::Parse { format: "gpx", .. }));
}

#[test]
fn test_unknown_version_is_parse_error() {
    let xml = br#"<?xml version="1.0"?>
<gpx version="2.0" creator="t"></gpx>"#;
    let err = decode_as(xml, Format::Gpx, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, TrackError::Parse { .. }));
}

#[test]
fn test_truncated_document_is_parse_error() {
    let xml = br#"<?xml version="1.0"?>
<gpx version="1.1" creator="t"><trk><trkseg>"#;
    assert!(decode_as(xml, Format::Gpx, &DecodeOptions::default()).is_err());
}

#[test]
fn test_invalid_coordinates_skip_the_point() {
    // Structural leniency: a trkpt with an unparseable latitude is dropped,
    // the rest of the document survives
    let xml = br#"<?xml version="1.0"?>
<gpx version="1.1" creator="t" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="not-a-number" lon="0.0"/>
    <trkpt lat="51.0" lon="0.0"/>
  </trkseg></trk>
</gpx>"#;
    let document = decode_as(xml, Format::Gpx, &DecodeOptions::default()).unwrap();
    assert_eq!(document.point_count(), 1);
}

#[test]
fn test_gpx_10_flat_metadata() {
    let xml = br#"<?xml version="1.0"?>
<gpx version="1.0" creator="t" xmlns="http://www.topografix.com/GPX/1/0">
  <name>Old Style</name>
  <desc>A 1.0 document</desc>
  <trk><trkseg>
    <trkpt lat="51.0" lon="0.0"/>
  </trkseg></trk>
</gpx>"#;
    let document = decode_as(xml, Format::Gpx, &DecodeOptions::default()).unwrap();
    assert_eq!(document.version, GpxVersion::V1_0);
    let metadata = document.metadata.as_ref().unwrap();
    assert_eq!(metadata.name.as_deref(), Some("Old Style"));
    assert_eq!(metadata.description.as_deref(), Some("A 1.0 document"));
}

#[test]
fn test_round_trip_preserves_structure() {
    let document = decode_sample();
    let bytes = encode(&document, Format::Gpx).unwrap();
    let reparsed = decode_as(&bytes, Format::Gpx, &DecodeOptions::default()).unwrap();

    assert_eq!(reparsed.version, document.version);
    assert_eq!(reparsed.creator, document.creator);
    assert_eq!(reparsed.point_count(), document.point_count());
    assert_eq!(reparsed.waypoints.len(), document.waypoints.len());

    for (a, b) in document.points().zip(reparsed.points()) {
        assert_eq!(a.latitude, b.latitude);
        assert_eq!(a.longitude, b.longitude);
        assert_eq!(a.elevation, b.elevation);
        assert_eq!(a.time, b.time);
    }
}

#[test]
fn test_encode_is_deterministic() {
    let document = decode_sample();
    let first = encode(&document, Format::Gpx).unwrap();
    let second = encode(&document, Format::Gpx).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_extensions_round_trip_verbatim() {
    let xml = br#"<?xml version="1.0"?>
<gpx version="1.1" creator="t" xmlns="http://www.topografix.com/GPX/1/1" xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
  <trk><trkseg>
    <trkpt lat="51.0" lon="0.0">
      <extensions><gpxtpx:TrackPointExtension><gpxtpx:hr>142</gpxtpx:hr></gpxtpx:TrackPointExtension></extensions>
    </trkpt>
  </trkseg></trk>
</gpx>"#;
    let document = decode_as(xml, Format::Gpx, &DecodeOptions::default()).unwrap();
    let point = document.first_point().unwrap();
    let raw = &point.extensions.as_ref().unwrap().raw;
    assert!(raw.contains("<gpxtpx:hr>142</gpxtpx:hr>"));

    let encoded = encode(&document, Format::Gpx).unwrap();
    let text = String::from_utf8(encoded).unwrap();
    assert!(text.contains("<gpxtpx:hr>142</gpxtpx:hr>"));
}

#[test]
fn test_encode_honors_recorded_precision() {
    let document = decode_sample();
    let encoded = encode(&document, Format::Gpx).unwrap();
    let text = String::from_utf8(encoded).unwrap();
    // Source coordinates had 5 decimals; re-encode keeps them
    assert!(text.contains(r#"lat="51.50740""#));
    assert!(text.contains(r#"lon="-0.12780""#));
}

#[test]
fn test_encode_gpx_10_writes_flat_metadata() {
    let xml = br#"<?xml version="1.0"?>
<gpx version="1.0" creator="t" xmlns="http://www.topografix.com/GPX/1/0">
  <name>Old Style</name>
  <trk><trkseg><trkpt lat="51.0" lon="0.0"/></trkseg></trk>
</gpx>"#;
    let document = decode_as(xml, Format::Gpx, &DecodeOptions::default()).unwrap();
    let encoded = String::from_utf8(encode(&document, Format::Gpx).unwrap()).unwrap();
    assert!(encoded.contains(r#"version="1.0""#));
    assert!(!encoded.contains("<metadata>"));
    assert!(encoded.contains("<name>Old Style</name>"));
}

#[test]
fn test_escaped_entities_resolve_and_round_trip() {
    let xml = br#"<?xml version="1.0"?>
<gpx version="1.1" creator="t" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><name>Rock &amp; Roll</name></metadata>
  <trk>
    <name>Fish &amp; Chips &lt;fast&gt;</name>
    <trkseg><trkpt lat="51.0" lon="0.0"/></trkseg>
  </trk>
</gpx>"#;
    let document = decode_as(xml, Format::Gpx, &DecodeOptions::default()).unwrap();
    // The model holds the resolved text, not the escaped source form
    assert_eq!(document.name(), Some("Rock & Roll"));
    assert_eq!(document.tracks[0].name.as_deref(), Some("Fish & Chips <fast>"));

    // Re-encoding escapes exactly once, so the cycle is stable
    let encoded = encode(&document, Format::Gpx).unwrap();
    let text = String::from_utf8(encoded.clone()).unwrap();
    assert!(text.contains("<name>Rock &amp; Roll</name>"));
    assert!(!text.contains("&amp;amp;"));

    let reparsed = decode_as(&encoded, Format::Gpx, &DecodeOptions::default()).unwrap();
    assert_eq!(reparsed.name(), Some("Rock & Roll"));
}

#[test]
fn test_metadata_author_forms() {
    // 1.1 nested form
    let nested = br#"<?xml version="1.0"?>
<gpx version="1.1" creator="t" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><author><name>Jane Doe</name></author></metadata>
</gpx>"#;
    let document = decode_as(nested, Format::Gpx, &DecodeOptions::default()).unwrap();
    assert_eq!(
        document.metadata.as_ref().unwrap().author.as_deref(),
        Some("Jane Doe")
    );

    // Bare-text form, with an entity to resolve
    let bare = br#"<?xml version="1.0"?>
<gpx version="1.1" creator="t" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><author>Smith &amp; Jones</author></metadata>
</gpx>"#;
    let document = decode_as(bare, Format::Gpx, &DecodeOptions::default()).unwrap();
    assert_eq!(
        document.metadata.as_ref().unwrap().author.as_deref(),
        Some("Smith & Jones")
    );
}

#[test]
fn test_not_utf8_is_parse_error() {
    let err = decode_as(&[0xff, 0xfe, 0x00], Format::Gpx, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, TrackError::Parse { format: "gpx", .. }));
}

//! FIT binary decoder (decode-only).
//!
//! Walks the FIT record stream, collecting `Record` messages with position
//! data into a single track. Coordinates arrive as semicircles and are
//! converted to degrees; `enhanced_altitude` is preferred over `altitude`
//! when both are present because it carries the full-range value.

use chrono::{DateTime, Utc};
use log::debug;

use crate::error::{Result, TrackError};
use crate::model::{Gpx, GpxVersion, Point, Segment, Track};

/// Semicircles-to-degrees conversion factor: 2^31 semicircles per 180°.
const SEMICIRCLE_DEGREES: f64 = 180.0 / 2_147_483_648.0;

/// Decode a FIT byte stream into a document with one track.
///
/// Fails with [`TrackError::Parse`] for malformed streams or streams
/// containing no positioned records.
pub fn decode(bytes: &[u8]) -> Result<Gpx> {
    let records = fitparser::from_bytes(bytes)
        .map_err(|e| TrackError::parse("fit", format!("FIT decode failed: {e}")))?;

    let mut points = Vec::new();
    let mut activity_name: Option<String> = None;
    let mut sport: Option<String> = None;

    for record in &records {
        match record.kind() {
            fitparser::profile::MesgNum::Record => {
                if let Some(point) = point_from_record(record) {
                    points.push(point);
                }
            }
            fitparser::profile::MesgNum::Sport => {
                for field in record.fields() {
                    match field.name() {
                        "name" => {
                            if let fitparser::Value::String(v) = field.value() {
                                activity_name = Some(v.clone());
                            }
                        }
                        "sport" => {
                            if let fitparser::Value::String(v) = field.value() {
                                sport = Some(v.clone());
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    if points.is_empty() {
        return Err(TrackError::parse(
            "fit",
            "no positioned records found in FIT stream",
        ));
    }
    debug!("decoded {} points from FIT stream", points.len());

    let mut document = Gpx::new(GpxVersion::V1_1, "trackkit (FIT import)");
    document.tracks.push(Track {
        name: activity_name,
        track_type: sport,
        segments: vec![Segment::from_points(points)],
    });
    Ok(document)
}

fn point_from_record(record: &fitparser::FitDataRecord) -> Option<Point> {
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut altitude: Option<f64> = None;
    let mut enhanced_altitude: Option<f64> = None;
    let mut timestamp: Option<DateTime<Utc>> = None;

    for field in record.fields() {
        match field.name() {
            "position_lat" => {
                if let fitparser::Value::SInt32(v) = field.value() {
                    latitude = Some(f64::from(*v) * SEMICIRCLE_DEGREES);
                }
            }
            "position_long" => {
                if let fitparser::Value::SInt32(v) = field.value() {
                    longitude = Some(f64::from(*v) * SEMICIRCLE_DEGREES);
                }
            }
            "altitude" => {
                if let fitparser::Value::Float64(v) = field.value() {
                    altitude = Some(*v);
                }
            }
            "enhanced_altitude" => {
                if let fitparser::Value::Float64(v) = field.value() {
                    enhanced_altitude = Some(*v);
                }
            }
            "timestamp" => {
                if let fitparser::Value::Timestamp(t) = field.value() {
                    timestamp = Some((*t).into());
                }
            }
            _ => {}
        }
    }

    let (latitude, longitude) = (latitude?, longitude?);
    let mut point = Point::new(latitude, longitude);
    if !point.is_valid() {
        return None;
    }
    point.elevation = enhanced_altitude.or(altitude);
    point.time = timestamp;
    Some(point)
}

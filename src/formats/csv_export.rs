//! CSV projection of a document (one-way).
//!
//! Takes an explicit ordered field list and emits one row per track point
//! in document order. A missing value is an empty cell, never a skipped
//! column.

use std::io;

use crate::error::{Result, TrackError};
use crate::model::Gpx;
use crate::tabular::{self, Field};

/// Render the document as CSV with the given columns.
///
/// When `header` is set the first row holds the field names.
///
/// # Example
/// ```
/// use trackkit::{Gpx, GpxVersion, Point, Segment, Track};
/// use trackkit::tabular::Field;
/// use trackkit::formats::csv_export;
///
/// let mut doc = Gpx::new(GpxVersion::V1_1, "example");
/// doc.tracks.push(Track {
///     segments: vec![Segment::from_points(vec![Point::new(51.5, -0.1)])],
///     ..Track::default()
/// });
///
/// let csv = csv_export::to_csv(&doc, &[Field::Latitude, Field::Longitude], true).unwrap();
/// assert_eq!(csv.lines().next(), Some("lat,lon"));
/// ```
pub fn to_csv(document: &Gpx, fields: &[Field], header: bool) -> Result<String> {
    let table = tabular::project(document, fields);
    let time_format = document.precision.time;

    let mut writer = csv::Writer::from_writer(Vec::new());
    if header {
        writer
            .write_record(fields.iter().map(Field::name))
            .map_err(csv_err)?;
    }
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|v| v.to_cell(time_format)))
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TrackError::Io(io::Error::other(e)))?;
    String::from_utf8(bytes)
        .map_err(|e| TrackError::parse("csv", format!("encoded output is not UTF-8: {e}")))
}

fn csv_err(e: csv::Error) -> TrackError {
    TrackError::Io(io::Error::other(e))
}

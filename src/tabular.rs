//! Tabular projection of a document.
//!
//! Produces an ordered set of named columns over all track points in
//! document order, for dataframe-style consumers (plotting, analysis).
//! Missing values are explicit [`Value::Null`] entries, never skipped rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Gpx, Point, TimeFormat};

/// A projectable per-point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Latitude,
    Longitude,
    Elevation,
    Time,
    DistanceFromPrevious,
    Speed,
    Pace,
    AscentRate,
    AscentSpeed,
}

impl Field {
    /// Column name used in tables and CSV headers.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Latitude => "lat",
            Field::Longitude => "lon",
            Field::Elevation => "ele",
            Field::Time => "time",
            Field::DistanceFromPrevious => "distance",
            Field::Speed => "speed",
            Field::Pace => "pace",
            Field::AscentRate => "ascent_rate",
            Field::AscentSpeed => "ascent_speed",
        }
    }

    /// Every field, in canonical order.
    pub fn all() -> [Field; 9] {
        [
            Field::Latitude,
            Field::Longitude,
            Field::Elevation,
            Field::Time,
            Field::DistanceFromPrevious,
            Field::Speed,
            Field::Pace,
            Field::AscentRate,
            Field::AscentSpeed,
        ]
    }

    fn extract(&self, point: &Point) -> Value {
        match self {
            Field::Latitude => Value::Float(point.latitude),
            Field::Longitude => Value::Float(point.longitude),
            Field::Elevation => point.elevation.into(),
            Field::Time => point.time.map_or(Value::Null, Value::Time),
            Field::DistanceFromPrevious => point.distance_from_previous.into(),
            Field::Speed => point.speed.into(),
            Field::Pace => point.pace.into(),
            Field::AscentRate => point.ascent_rate.into(),
            Field::AscentSpeed => point.ascent_speed.into(),
        }
    }
}

/// A single cell value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Float(f64),
    Time(DateTime<Utc>),
    /// Explicit missing-value marker.
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Render as a CSV cell; `Null` becomes the empty string.
    pub(crate) fn to_cell(self, time_format: TimeFormat) -> String {
        match self {
            Value::Float(v) => format!("{v}"),
            Value::Time(t) => time_format.format(&t),
            Value::Null => String::new(),
        }
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Value::Null, Value::Float)
    }
}

/// An ordered set of named columns over all track points in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    fields: Vec<Field>,
    columns: Vec<Vec<Value>>,
    rows: usize,
}

impl Table {
    /// Number of rows (track points).
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// The projected fields, in projection order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Column values for a field, if it was projected.
    pub fn column(&self, field: Field) -> Option<&[Value]> {
        self.fields
            .iter()
            .position(|f| *f == field)
            .map(|i| self.columns[i].as_slice())
    }

    /// Iterate rows as slices of cell values in field order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.rows).map(move |r| self.columns.iter().map(|c| c[r]).collect())
    }
}

/// Project the document's track points onto the given fields.
///
/// One row per point in document order; a field a point lacks yields
/// [`Value::Null`] in that row.
pub fn project(document: &Gpx, fields: &[Field]) -> Table {
    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); fields.len()];
    let mut rows = 0;

    for point in document.points() {
        for (field, column) in fields.iter().zip(columns.iter_mut()) {
            column.push(field.extract(point));
        }
        rows += 1;
    }

    Table {
        fields: fields.to_vec(),
        columns,
        rows,
    }
}

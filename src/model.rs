//! The in-memory track model.
//!
//! A decoded activity is a [`Gpx`] document: metadata, waypoints, routes and
//! tracks, where tracks are ordered segments of ordered [`Point`]s. The same
//! point type is used for waypoints, route points and track points; the role
//! comes from the containing collection rather than a type hierarchy.
//!
//! Derived fields on [`Point`] (distance, speed, pace, ascent rate/speed)
//! are never parsed from input. They stay `None` until a computing pass in
//! [`crate::analysis`] fills them, and any structural mutation clears them
//! again together with the document-level aggregate cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo_utils::haversine_distance;

/// A single geographic point with optional elevation, timestamp and
/// extensions.
///
/// # Example
/// ```
/// use trackkit::Point;
/// let point = Point::new(51.5074, -0.1278); // London
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in degrees, -90..90.
    pub latitude: f64,
    /// Longitude in degrees, -180..180.
    pub longitude: f64,
    /// Elevation in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    /// UTC timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    /// Opaque extension content carried through decode/encode verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,

    /// Distance from the previous point in meters (derived).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_previous: Option<f64>,
    /// Speed over the incoming interval in km/h (derived).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Pace over the incoming interval in min/km (derived).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    /// Elevation gain per horizontal distance over the incoming interval,
    /// as a percentage (derived).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascent_rate: Option<f64>,
    /// Vertical speed over the incoming interval in m/h (derived).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascent_speed: Option<f64>,
}

impl Point {
    /// Create a point with coordinates only.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            time: None,
            extensions: None,
            distance_from_previous: None,
            speed: None,
            pace: None,
            ascent_rate: None,
            ascent_speed: None,
        }
    }

    /// Create a point with coordinates and elevation.
    pub fn with_elevation(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            elevation: Some(elevation),
            ..Self::new(latitude, longitude)
        }
    }

    /// Create a point with coordinates and a UTC timestamp.
    pub fn with_time(latitude: f64, longitude: f64, time: DateTime<Utc>) -> Self {
        Self {
            time: Some(time),
            ..Self::new(latitude, longitude)
        }
    }

    /// Check that coordinates are finite and within WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Clear every derived field back to "not yet computed".
    pub(crate) fn clear_derived(&mut self) {
        self.distance_from_previous = None;
        self.speed = None;
        self.pace = None;
        self.ascent_rate = None;
        self.ascent_speed = None;
    }
}

/// Opaque extension bag: the raw inner XML of an `<extensions>` element,
/// preserved verbatim across decode/encode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Extensions {
    /// Raw inner XML, exactly as it appeared in the source document.
    pub raw: String,
}

impl Extensions {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

/// Bounding box over latitude/longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Compute bounds from a set of points. `None` if the slice is empty.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        Self::from_iter(points.iter())
    }

    pub(crate) fn from_iter<'a>(points: impl Iterator<Item = &'a Point>) -> Option<Self> {
        let mut bounds: Option<Bounds> = None;
        for p in points {
            let b = bounds.get_or_insert(Bounds {
                min_lat: p.latitude,
                max_lat: p.latitude,
                min_lon: p.longitude,
                max_lon: p.longitude,
            });
            b.min_lat = b.min_lat.min(p.latitude);
            b.max_lat = b.max_lat.max(p.latitude);
            b.min_lon = b.min_lon.min(p.longitude);
            b.max_lon = b.max_lon.max(p.longitude);
        }
        bounds
    }

    /// Midpoint of the bounds (not the centroid of the points).
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

/// A named standalone point of interest, not part of any track or route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    pub point: Option<Point>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub symbol: Option<String>,
}

impl Waypoint {
    pub fn at(point: Point) -> Self {
        Self {
            point: Some(point),
            ..Self::default()
        }
    }
}

/// A planned, unsegmented sequence of points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub name: Option<String>,
    pub description: Option<String>,
    pub points: Vec<Point>,
}

/// An ordered run of recorded points. Insertion order is the order along
/// the path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    pub points: Vec<Point>,
}

impl Segment {
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Sum of consecutive pairwise distances in meters.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| haversine_distance(&w[0], &w[1]))
            .sum()
    }
}

/// A recorded path: one or more segments plus a name and optional type tag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Track {
    pub name: Option<String>,
    pub track_type: Option<String>,
    pub segments: Vec<Segment>,
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub bounds: Option<Bounds>,
}

impl Metadata {
    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.author.is_none()
            && self.time.is_none()
            && self.bounds.is_none()
    }
}

/// GPX schema version a document was declared with (or will be written as).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpxVersion {
    V1_0,
    V1_1,
}

impl GpxVersion {
    /// The version attribute value ("1.0" / "1.1").
    pub fn as_str(&self) -> &'static str {
        match self {
            GpxVersion::V1_0 => "1.0",
            GpxVersion::V1_1 => "1.1",
        }
    }

    /// Parse a `version` attribute value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "1.0" => Some(GpxVersion::V1_0),
            "1.1" => Some(GpxVersion::V1_1),
            _ => None,
        }
    }

    /// Topografix namespace URI for this version.
    pub fn namespace(&self) -> &'static str {
        match self {
            GpxVersion::V1_0 => "http://www.topografix.com/GPX/1/0",
            GpxVersion::V1_1 => "http://www.topografix.com/GPX/1/1",
        }
    }
}

/// Timestamp layout observed in the source document, reused on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    /// `%Y-%m-%dT%H:%M:%SZ`
    #[default]
    Seconds,
    /// `%Y-%m-%dT%H:%M:%S%.3fZ`
    Fractional,
}

impl TimeFormat {
    pub(crate) fn format(&self, t: &DateTime<Utc>) -> String {
        match self {
            TimeFormat::Seconds => t.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            TimeFormat::Fractional => t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        }
    }
}

/// Decimal precision observed in the source document, reused on encode so
/// that a re-encoded file matches the source formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    /// Decimal places for latitude/longitude.
    pub lat_lon: usize,
    /// Decimal places for elevation.
    pub elevation: usize,
    /// Timestamp layout.
    pub time: TimeFormat,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            lat_lon: 6,
            elevation: 1,
            time: TimeFormat::Seconds,
        }
    }
}

/// Lazily-filled aggregate metrics, owned by the document and cleared on
/// any structural mutation.
#[derive(Debug, Clone, Default)]
pub(crate) struct AnalysisCache {
    pub distance: Option<f64>,
    pub ascent: Option<f64>,
    pub descent: Option<f64>,
    pub moving_time: Option<f64>,
    pub stopped_time: Option<f64>,
}

/// The root document: an activity decoded from GPX, KML/KMZ or FIT.
///
/// A valid document always carries a version and creator; it may contain
/// zero tracks (e.g. a waypoint-only file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gpx {
    pub version: GpxVersion,
    pub creator: String,
    pub metadata: Option<Metadata>,
    pub waypoints: Vec<Waypoint>,
    pub routes: Vec<Route>,
    pub tracks: Vec<Track>,
    pub extensions: Option<Extensions>,
    /// Formatting observed on decode, reused on encode.
    #[serde(default)]
    pub precision: Precision,
    #[serde(skip)]
    pub(crate) cache: AnalysisCache,
}

impl Gpx {
    /// Create an empty document.
    pub fn new(version: GpxVersion, creator: impl Into<String>) -> Self {
        Self {
            version,
            creator: creator.into(),
            metadata: None,
            waypoints: Vec::new(),
            routes: Vec::new(),
            tracks: Vec::new(),
            extensions: None,
            precision: Precision::default(),
            cache: AnalysisCache::default(),
        }
    }

    /// Iterate over all track points in document order.
    ///
    /// The iterator is lazy, restartable and finite; waypoints and route
    /// points are not included.
    pub fn points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.tracks
            .iter()
            .flat_map(|t| t.segments.iter())
            .flat_map(|s| s.points.iter())
    }

    pub(crate) fn points_mut(&mut self) -> impl Iterator<Item = &mut Point> + '_ {
        self.tracks
            .iter_mut()
            .flat_map(|t| t.segments.iter_mut())
            .flat_map(|s| s.points.iter_mut())
    }

    /// Every point in the document: waypoints, route points, then track
    /// points.
    fn all_points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.waypoints
            .iter()
            .filter_map(|w| w.point.as_ref())
            .chain(self.routes.iter().flat_map(|r| r.points.iter()))
            .chain(self.points())
    }

    /// Number of track points in the document.
    pub fn point_count(&self) -> usize {
        self.points().count()
    }

    /// Bounding box over every point in the document (waypoints, routes and
    /// tracks). `None` when the document has no points at all.
    ///
    /// Metadata bounds, when absent, are computed on demand through this.
    pub fn bounds(&self) -> Option<Bounds> {
        if let Some(b) = self.metadata.as_ref().and_then(|m| m.bounds) {
            return Some(b);
        }
        Bounds::from_iter(self.all_points())
    }

    /// Center of the bounding box. `None` when the document has no points.
    pub fn center(&self) -> Option<Point> {
        self.bounds().map(|b| b.center())
    }

    /// First track point in document order.
    pub fn first_point(&self) -> Option<&Point> {
        self.points().next()
    }

    /// Last track point in document order.
    pub fn last_point(&self) -> Option<&Point> {
        self.points().last()
    }

    /// The four track points achieving minimum latitude, minimum longitude,
    /// maximum latitude and maximum longitude, in that order.
    ///
    /// `None` when the document has no track points.
    pub fn extreme_points(&self) -> Option<(&Point, &Point, &Point, &Point)> {
        let mut iter = self.points();
        let first = iter.next()?;
        let mut min_lat = first;
        let mut min_lon = first;
        let mut max_lat = first;
        let mut max_lon = first;
        for p in iter {
            if p.latitude < min_lat.latitude {
                min_lat = p;
            }
            if p.longitude < min_lon.longitude {
                min_lon = p;
            }
            if p.latitude > max_lat.latitude {
                max_lat = p;
            }
            if p.longitude > max_lon.longitude {
                max_lon = p;
            }
        }
        Some((min_lat, min_lon, max_lat, max_lon))
    }

    /// Activity name: metadata name when present, otherwise the first
    /// track's name.
    pub fn name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .or_else(|| self.tracks.first().and_then(|t| t.name.as_deref()))
    }

    /// Set the activity name on the metadata (created if absent) and on the
    /// first track.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.metadata
            .get_or_insert_with(Metadata::default)
            .name = Some(name.clone());
        if let Some(track) = self.tracks.first_mut() {
            track.name = Some(name);
        }
    }

    /// Remove document metadata. Idempotent.
    pub fn remove_metadata(&mut self) {
        self.metadata = None;
        self.invalidate_caches();
    }

    /// Remove elevation from every point. Idempotent.
    pub fn remove_elevation(&mut self) {
        self.for_each_point(|p| p.elevation = None);
        self.invalidate_caches();
    }

    /// Remove timestamps from every point and the metadata. Idempotent.
    pub fn remove_time(&mut self) {
        self.for_each_point(|p| p.time = None);
        if let Some(metadata) = self.metadata.as_mut() {
            metadata.time = None;
        }
        self.invalidate_caches();
    }

    /// Remove extension bags from every point and the document. Idempotent.
    pub fn remove_extensions(&mut self) {
        self.for_each_point(|p| p.extensions = None);
        self.extensions = None;
        self.invalidate_caches();
    }

    fn for_each_point(&mut self, mut f: impl FnMut(&mut Point)) {
        for waypoint in &mut self.waypoints {
            if let Some(p) = waypoint.point.as_mut() {
                f(p);
            }
        }
        for route in &mut self.routes {
            for p in &mut route.points {
                f(p);
            }
        }
        for track in &mut self.tracks {
            for segment in &mut track.segments {
                for p in &mut segment.points {
                    f(p);
                }
            }
        }
    }

    /// Clear the aggregate cache and every per-point derived field.
    ///
    /// Called by every structural mutation; recomputation happens lazily on
    /// the next request.
    pub(crate) fn invalidate_caches(&mut self) {
        self.cache = AnalysisCache::default();
        self.for_each_point(Point::clear_derived);
    }

    /// Merge two documents into a new GPX 1.1 document.
    ///
    /// Waypoints, routes and tracks are concatenated in argument order;
    /// metadata comes from the first document that has any.
    pub fn merge(first: &Gpx, second: &Gpx) -> Gpx {
        let mut merged = Gpx::new(GpxVersion::V1_1, first.creator.clone());
        merged.metadata = first.metadata.clone().or_else(|| second.metadata.clone());
        merged.waypoints = [first.waypoints.clone(), second.waypoints.clone()].concat();
        merged.routes = [first.routes.clone(), second.routes.clone()].concat();
        merged.tracks = [first.tracks.clone(), second.tracks.clone()].concat();
        merged.precision = first.precision;
        merged
    }
}

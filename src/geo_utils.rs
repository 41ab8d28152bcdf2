//! Geographic utilities: distance, bearing, deltas, bounds and center
//! calculations.
//!
//! All functions are pure and operate on [`Point`]/[`Bounds`] from the model.
//! Latitude/longitude are WGS84 degrees, distances are meters, durations are
//! seconds.

use crate::{Bounds, Point};

/// Earth radius in meters (WGS84 semi-major axis).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Calculate the haversine (great-circle) distance between two points in meters.
///
/// Symmetric, and exactly `0.0` when both points coincide.
///
/// # Example
/// ```
/// use trackkit::Point;
/// use trackkit::geo_utils::haversine_distance;
///
/// let london = Point::new(51.5074, -0.1278);
/// let paris = Point::new(48.8566, 2.3522);
/// let dist = haversine_distance(&london, &paris);
/// assert!((dist - 343_900.0).abs() < 5_000.0); // ~344 km
/// ```
pub fn haversine_distance(p1: &Point, p2: &Point) -> f64 {
    if p1.latitude == p2.latitude && p1.longitude == p2.longitude {
        return 0.0;
    }

    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lon = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS * c
}

/// Initial bearing from `p1` to `p2` in degrees, normalized to `[0, 360)`.
pub fn initial_bearing(p1: &Point, p2: &Point) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let delta_lon = (p2.longitude - p1.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Elevation difference `p2 - p1` in meters.
///
/// `None` when either point lacks elevation; absence propagates rather than
/// defaulting to zero.
pub fn elevation_delta(p1: &Point, p2: &Point) -> Option<f64> {
    match (p1.elevation, p2.elevation) {
        (Some(e1), Some(e2)) => Some(e2 - e1),
        _ => None,
    }
}

/// Time difference `p2 - p1` in seconds.
///
/// `None` when either point lacks a timestamp. Negative values (out-of-order
/// timestamps) are preserved; callers decide policy.
pub fn time_delta(p1: &Point, p2: &Point) -> Option<f64> {
    match (p1.time, p2.time) {
        (Some(t1), Some(t2)) => {
            let d = t2.signed_duration_since(t1);
            Some(d.num_milliseconds() as f64 / 1000.0)
        }
        _ => None,
    }
}

/// Great-circle cross-track distance in meters: how far `point` deviates
/// from the geodesic through `start` and `end`.
///
/// Falls back to the plain distance from `start` when the chord is
/// degenerate (`start == end`).
pub fn cross_track_distance(start: &Point, end: &Point, point: &Point) -> f64 {
    let d13 = haversine_distance(start, point);
    if d13 == 0.0 {
        return 0.0;
    }
    if start.latitude == end.latitude && start.longitude == end.longitude {
        return d13;
    }

    let bearing13 = initial_bearing(start, point).to_radians();
    let bearing12 = initial_bearing(start, end).to_radians();

    ((d13 / EARTH_RADIUS).sin() * (bearing13 - bearing12).sin()).asin() * EARTH_RADIUS
}

/// Compute the bounding box of a set of points.
///
/// Returns `None` for an empty slice.
pub fn compute_bounds(points: &[Point]) -> Option<Bounds> {
    Bounds::from_points(points)
}

/// Compute the center of a set of points (midpoint of the bounding box,
/// not the centroid).
///
/// Returns `None` for an empty slice.
pub fn compute_center(points: &[Point]) -> Option<Point> {
    compute_bounds(points).map(|b| b.center())
}

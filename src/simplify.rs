//! Lossy track reduction: Ramer-Douglas-Peucker simplification and
//! heuristic GPS-error removal.
//!
//! Both operate strictly per segment, never merge points across segment
//! boundaries, and always preserve each segment's first and last point.
//! They are structural mutations, so they clear every derived-field cache
//! on the document.

use log::info;

use crate::geo_utils::{cross_track_distance, haversine_distance, time_delta};
use crate::model::{Gpx, Point, Segment};

/// Default Ramer-Douglas-Peucker tolerance in meters.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 2.0;

/// Default implausible-motion threshold in km/h for GPS-error removal.
/// Faster than any human-powered activity while well below the spike
/// magnitudes the heuristic targets.
pub const DEFAULT_ERROR_SPEED: f64 = 100.0;

/// Default minimum spacing in meters for [`Gpx::remove_close_points`].
pub const DEFAULT_MIN_SPACING: f64 = 1.0;

impl Gpx {
    /// Simplify every track segment with [`DEFAULT_SIMPLIFY_TOLERANCE`].
    pub fn simplify(&mut self) {
        self.simplify_with(DEFAULT_SIMPLIFY_TOLERANCE);
    }

    /// Simplify every track segment with a perpendicular-deviation
    /// tolerance in meters.
    ///
    /// Deterministic: identical input and tolerance yield an identical
    /// output sequence, and re-running on the output is a no-op.
    pub fn simplify_with(&mut self, tolerance: f64) {
        let before = self.point_count();
        for track in &mut self.tracks {
            for segment in &mut track.segments {
                simplify_segment(segment, tolerance);
            }
        }
        let after = self.point_count();
        info!("simplified {before} points down to {after} (tolerance {tolerance} m)");
        self.invalidate_caches();
    }

    /// Remove isolated GPS spikes with [`DEFAULT_ERROR_SPEED`].
    pub fn remove_gps_errors(&mut self) -> usize {
        self.remove_gps_errors_with(DEFAULT_ERROR_SPEED)
    }

    /// Remove isolated GPS spikes: points whose incoming and outgoing
    /// implied speeds both exceed `max_speed` (km/h).
    ///
    /// A single pass over each segment (no fixpoint iteration), judged
    /// against the original geometry. Only interior points can qualify, so
    /// a segment never shrinks below 2 points. Returns the number of points
    /// removed.
    pub fn remove_gps_errors_with(&mut self, max_speed: f64) -> usize {
        let mut removed = 0;
        for track in &mut self.tracks {
            for segment in &mut track.segments {
                removed += remove_segment_errors(segment, max_speed);
            }
        }
        if removed > 0 {
            info!("removed {removed} GPS error points (threshold {max_speed} km/h)");
        }
        self.invalidate_caches();
        removed
    }

    /// Drop interior points closer than `min_spacing` meters to the last
    /// retained point. Segment endpoints are always kept.
    pub fn remove_close_points(&mut self, min_spacing: f64) {
        for track in &mut self.tracks {
            for segment in &mut track.segments {
                thin_segment(segment, min_spacing);
            }
        }
        self.invalidate_caches();
    }
}

/// Ramer-Douglas-Peucker reduction of one segment, in meters.
///
/// Keeps both endpoints unconditionally. Ties in maximum deviation resolve
/// to the earliest index (strict `>` comparison), making the result stable.
pub fn simplify_segment(segment: &mut Segment, tolerance: f64) {
    let n = segment.points.len();
    if n < 3 {
        return;
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;
    mark_kept(&segment.points, tolerance, &mut keep, 0, n - 1);

    let mut index = 0;
    segment.points.retain(|_| {
        let kept = keep[index];
        index += 1;
        kept
    });
}

fn mark_kept(points: &[Point], tolerance: f64, keep: &mut [bool], first: usize, last: usize) {
    if last <= first + 1 {
        return;
    }

    let mut max_deviation = 0.0;
    let mut max_index = first;
    for i in first + 1..last {
        let deviation = cross_track_distance(&points[first], &points[last], &points[i]).abs();
        if deviation > max_deviation {
            max_deviation = deviation;
            max_index = i;
        }
    }

    if max_deviation > tolerance {
        keep[max_index] = true;
        mark_kept(points, tolerance, keep, first, max_index);
        mark_kept(points, tolerance, keep, max_index, last);
    }
}

/// Flag and remove interior spike points in one pass.
fn remove_segment_errors(segment: &mut Segment, max_speed: f64) -> usize {
    let n = segment.points.len();
    if n < 3 {
        return 0;
    }

    // Implied speed (km/h) of each consecutive interval of the original
    // geometry; `None` when timestamps are missing or out of order.
    let speeds: Vec<Option<f64>> = segment
        .points
        .windows(2)
        .map(|pair| {
            let seconds = time_delta(&pair[0], &pair[1]).filter(|s| *s > 0.0)?;
            let meters = haversine_distance(&pair[0], &pair[1]);
            Some(meters / 1000.0 / (seconds / 3600.0))
        })
        .collect();

    let flagged: Vec<bool> = (0..n)
        .map(|i| {
            if i == 0 || i == n - 1 {
                return false;
            }
            let incoming = speeds[i - 1];
            let outgoing = speeds[i];
            matches!((incoming, outgoing), (Some(a), Some(b)) if a > max_speed && b > max_speed)
        })
        .collect();

    let before = segment.points.len();
    let mut index = 0;
    segment.points.retain(|_| {
        let keep = !flagged[index];
        index += 1;
        keep
    });
    before - segment.points.len()
}

fn thin_segment(segment: &mut Segment, min_spacing: f64) {
    let n = segment.points.len();
    if n < 3 {
        return;
    }

    let mut kept: Vec<Point> = Vec::with_capacity(n);
    kept.push(segment.points[0].clone());
    for (i, point) in segment.points.iter().enumerate().skip(1) {
        let last = i == n - 1;
        if last || haversine_distance(kept.last().map_or(point, |p| p), point) >= min_spacing {
            kept.push(point.clone());
        }
    }
    segment.points = kept;
}

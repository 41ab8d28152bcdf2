//! Kinematics: per-point derived series and document aggregates.
//!
//! Per-point passes fill the derived fields on [`Point`]
//! (`distance_from_previous`, `speed`, `pace`, `ascent_rate`,
//! `ascent_speed`). Each value depends only on the point and its predecessor
//! within the same segment; the first point of a segment stays `None`.
//!
//! Aggregates are computed lazily and cached on the document; any structural
//! mutation (simplify, cleanup, `remove_*`) clears the cache and the derived
//! fields. Absence is explicit: a missing elevation or timestamp yields
//! `None` for the affected values, and whole-document aggregates fail with
//! [`TrackError::MissingData`] when no point in the document carries the
//! field they need.

use chrono::{DateTime, Utc};
use log::debug;

use crate::error::{Result, TrackError};
use crate::geo_utils::{elevation_delta, haversine_distance, time_delta};
use crate::model::{Gpx, Point};

/// Speed threshold (km/h) separating moving from stopped intervals.
pub const DEFAULT_MOVING_SPEED: f64 = 1.0;

/// Incoming-interval quantities for one consecutive point pair.
struct Interval {
    distance: f64,
    elevation: Option<f64>,
    seconds: Option<f64>,
}

impl Interval {
    fn between(prev: &Point, point: &Point) -> Self {
        Self {
            distance: haversine_distance(prev, point),
            elevation: elevation_delta(prev, point),
            seconds: time_delta(prev, point),
        }
    }

    /// Speed in km/h; `None` unless the interval has a positive duration.
    fn speed(&self) -> Option<f64> {
        match self.seconds {
            Some(s) if s > 0.0 => Some(self.distance / 1000.0 / (s / 3600.0)),
            _ => None,
        }
    }

    /// Pace in min/km; `None` unless duration is positive and distance
    /// nonzero.
    fn pace(&self) -> Option<f64> {
        match self.seconds {
            Some(s) if s > 0.0 && self.distance > 0.0 => {
                Some(s / 60.0 / (self.distance / 1000.0))
            }
            _ => None,
        }
    }

    /// Grade percentage; `None` at zero horizontal distance or missing
    /// elevation.
    fn ascent_rate(&self) -> Option<f64> {
        match self.elevation {
            Some(delta) if self.distance > 0.0 => Some(delta / self.distance * 100.0),
            _ => None,
        }
    }

    /// Vertical speed in m/h; `None` unless duration is positive and both
    /// elevations present.
    fn ascent_speed(&self) -> Option<f64> {
        match (self.elevation, self.seconds) {
            (Some(delta), Some(s)) if s > 0.0 => Some(delta / (s / 3600.0)),
            _ => None,
        }
    }
}

impl Gpx {
    /// Whether any point in the document carries elevation.
    pub fn has_elevation_data(&self) -> bool {
        self.points().any(|p| p.elevation.is_some())
    }

    /// Whether any point in the document carries a timestamp.
    pub fn has_time_data(&self) -> bool {
        self.points().any(|p| p.time.is_some())
    }

    /// Fill `distance_from_previous` on every track point.
    pub fn compute_points_distance(&mut self) {
        self.compute_per_point(|point, interval| {
            point.distance_from_previous = Some(interval.distance);
        });
    }

    /// Fill `speed` (km/h) on every track point.
    pub fn compute_points_speed(&mut self) {
        self.compute_per_point(|point, interval| point.speed = interval.speed());
    }

    /// Fill `pace` (min/km) on every track point.
    pub fn compute_points_pace(&mut self) {
        self.compute_per_point(|point, interval| point.pace = interval.pace());
    }

    /// Fill `ascent_rate` (grade %) on every track point.
    pub fn compute_points_ascent_rate(&mut self) {
        self.compute_per_point(|point, interval| point.ascent_rate = interval.ascent_rate());
    }

    /// Fill `ascent_speed` (m/h) on every track point.
    pub fn compute_points_ascent_speed(&mut self) {
        self.compute_per_point(|point, interval| point.ascent_speed = interval.ascent_speed());
    }

    /// Run `apply` on every point after the first of each segment, with its
    /// incoming interval.
    fn compute_per_point(&mut self, mut apply: impl FnMut(&mut Point, &Interval)) {
        for track in &mut self.tracks {
            for segment in &mut track.segments {
                for i in 1..segment.points.len() {
                    let (before, after) = segment.points.split_at_mut(i);
                    let interval = Interval::between(&before[i - 1], &after[0]);
                    apply(&mut after[0], &interval);
                }
            }
        }
    }

    /// Total distance in meters over the flattened track-point sequence.
    ///
    /// Cached until the next structural mutation.
    pub fn distance(&mut self) -> f64 {
        if let Some(distance) = self.cache.distance {
            return distance;
        }
        let mut total = 0.0;
        let mut prev: Option<&Point> = None;
        for point in self.points() {
            if let Some(p) = prev {
                total += haversine_distance(p, point);
            }
            prev = Some(point);
        }
        debug!("computed total distance: {total:.1} m");
        self.cache.distance = Some(total);
        total
    }

    /// Total ascent in meters: the sum of positive elevation deltas between
    /// consecutive elevation-bearing points. Points without elevation are
    /// skipped, not treated as zero elevation.
    pub fn ascent(&mut self) -> Result<f64> {
        if let Some(ascent) = self.cache.ascent {
            return Ok(ascent);
        }
        let (ascent, descent) = self.elevation_sums("ascent")?;
        self.cache.ascent = Some(ascent);
        self.cache.descent = Some(descent);
        Ok(ascent)
    }

    /// Total descent in meters (a positive quantity), mirroring [`Gpx::ascent`].
    pub fn descent(&mut self) -> Result<f64> {
        if let Some(descent) = self.cache.descent {
            return Ok(descent);
        }
        let (ascent, descent) = self.elevation_sums("descent")?;
        self.cache.ascent = Some(ascent);
        self.cache.descent = Some(descent);
        Ok(descent)
    }

    fn elevation_sums(&self, operation: &'static str) -> Result<(f64, f64)> {
        if !self.has_elevation_data() {
            return Err(TrackError::MissingData {
                field: "elevation",
                operation,
            });
        }
        let mut ascent = 0.0;
        let mut descent = 0.0;
        let mut prev: Option<f64> = None;
        for point in self.points() {
            let Some(elevation) = point.elevation else {
                continue;
            };
            if let Some(previous) = prev {
                let delta = elevation - previous;
                if delta > 0.0 {
                    ascent += delta;
                } else {
                    descent -= delta;
                }
            }
            prev = Some(elevation);
        }
        Ok((ascent, descent))
    }

    /// Minimum elevation in meters across all track points.
    pub fn min_elevation(&self) -> Result<f64> {
        self.elevation_extreme("min_elevation", f64::min)
    }

    /// Maximum elevation in meters across all track points.
    pub fn max_elevation(&self) -> Result<f64> {
        self.elevation_extreme("max_elevation", f64::max)
    }

    fn elevation_extreme(
        &self,
        operation: &'static str,
        pick: impl Fn(f64, f64) -> f64,
    ) -> Result<f64> {
        self.points()
            .filter_map(|p| p.elevation)
            .reduce(pick)
            .ok_or(TrackError::MissingData {
                field: "elevation",
                operation,
            })
    }

    /// First timestamp in document order.
    pub fn start_time(&self) -> Result<DateTime<Utc>> {
        self.points()
            .find_map(|p| p.time)
            .ok_or(TrackError::MissingData {
                field: "time",
                operation: "start_time",
            })
    }

    /// Last timestamp in document order.
    pub fn stop_time(&self) -> Result<DateTime<Utc>> {
        self.points()
            .filter_map(|p| p.time)
            .last()
            .ok_or(TrackError::MissingData {
                field: "time",
                operation: "stop_time",
            })
    }

    /// Total elapsed time in seconds, as `moving_time + stopped_time`.
    ///
    /// Intervals with missing or non-positive duration contribute to
    /// neither side nor the total.
    pub fn total_elapsed_time(&mut self) -> Result<f64> {
        Ok(self.moving_time()? + self.stopped_time()?)
    }

    /// Time in seconds spent moving: intervals whose implied speed is at
    /// least [`DEFAULT_MOVING_SPEED`]. Cached.
    pub fn moving_time(&mut self) -> Result<f64> {
        self.partition_time()?;
        Ok(self.cache.moving_time.unwrap_or(0.0))
    }

    /// Time in seconds spent stopped: intervals whose implied speed is
    /// below [`DEFAULT_MOVING_SPEED`], zero, or undefined. Cached.
    pub fn stopped_time(&mut self) -> Result<f64> {
        self.partition_time()?;
        Ok(self.cache.stopped_time.unwrap_or(0.0))
    }

    fn partition_time(&mut self) -> Result<()> {
        if self.cache.moving_time.is_some() && self.cache.stopped_time.is_some() {
            return Ok(());
        }
        if !self.has_time_data() {
            return Err(TrackError::MissingData {
                field: "time",
                operation: "moving_time",
            });
        }

        let mut moving = 0.0;
        let mut stopped = 0.0;
        for track in &self.tracks {
            for segment in &track.segments {
                for pair in segment.points.windows(2) {
                    let interval = Interval::between(&pair[0], &pair[1]);
                    let Some(seconds) = interval.seconds.filter(|s| *s > 0.0) else {
                        continue;
                    };
                    match interval.speed() {
                        Some(speed) if speed >= DEFAULT_MOVING_SPEED => moving += seconds,
                        _ => stopped += seconds,
                    }
                }
            }
        }

        self.cache.moving_time = Some(moving);
        self.cache.stopped_time = Some(stopped);
        Ok(())
    }

    /// Average speed in km/h over the total elapsed time.
    pub fn avg_speed(&mut self) -> Result<f64> {
        let elapsed = self.total_elapsed_time()?;
        if elapsed <= 0.0 {
            return Ok(0.0);
        }
        Ok(self.distance() / 1000.0 / (elapsed / 3600.0))
    }

    /// Average speed in km/h over moving time only.
    pub fn avg_moving_speed(&mut self) -> Result<f64> {
        let moving = self.moving_time()?;
        if moving <= 0.0 {
            return Ok(0.0);
        }
        Ok(self.distance() / 1000.0 / (moving / 3600.0))
    }

    /// Average pace in min/km over the total elapsed time.
    pub fn avg_pace(&mut self) -> Result<f64> {
        let elapsed = self.total_elapsed_time()?;
        let distance = self.distance();
        if distance <= 0.0 {
            return Ok(0.0);
        }
        Ok(elapsed / 60.0 / (distance / 1000.0))
    }

    /// Average pace in min/km over moving time only.
    pub fn avg_moving_pace(&mut self) -> Result<f64> {
        let moving = self.moving_time()?;
        let distance = self.distance();
        if distance <= 0.0 {
            return Ok(0.0);
        }
        Ok(moving / 60.0 / (distance / 1000.0))
    }

    /// Minimum per-point speed in km/h. `Ok(None)` when every entry in the
    /// series is undefined; an error when no point carries timestamps.
    pub fn min_speed(&mut self) -> Result<Option<f64>> {
        self.speed_series_extreme("min_speed", f64::min)
    }

    /// Maximum per-point speed in km/h.
    pub fn max_speed(&mut self) -> Result<Option<f64>> {
        self.speed_series_extreme("max_speed", f64::max)
    }

    fn speed_series_extreme(
        &mut self,
        operation: &'static str,
        pick: impl Fn(f64, f64) -> f64,
    ) -> Result<Option<f64>> {
        if !self.has_time_data() {
            return Err(TrackError::MissingData {
                field: "time",
                operation,
            });
        }
        self.compute_points_speed();
        Ok(self.points().filter_map(|p| p.speed).reduce(pick))
    }

    /// Minimum per-point pace in min/km.
    pub fn min_pace(&mut self) -> Result<Option<f64>> {
        self.pace_series_extreme("min_pace", f64::min)
    }

    /// Maximum per-point pace in min/km.
    pub fn max_pace(&mut self) -> Result<Option<f64>> {
        self.pace_series_extreme("max_pace", f64::max)
    }

    fn pace_series_extreme(
        &mut self,
        operation: &'static str,
        pick: impl Fn(f64, f64) -> f64,
    ) -> Result<Option<f64>> {
        if !self.has_time_data() {
            return Err(TrackError::MissingData {
                field: "time",
                operation,
            });
        }
        self.compute_points_pace();
        Ok(self.points().filter_map(|p| p.pace).reduce(pick))
    }

    /// Minimum per-point ascent rate (grade %).
    pub fn min_ascent_rate(&mut self) -> Result<Option<f64>> {
        self.ascent_rate_extreme("min_ascent_rate", f64::min)
    }

    /// Maximum per-point ascent rate (grade %).
    pub fn max_ascent_rate(&mut self) -> Result<Option<f64>> {
        self.ascent_rate_extreme("max_ascent_rate", f64::max)
    }

    fn ascent_rate_extreme(
        &mut self,
        operation: &'static str,
        pick: impl Fn(f64, f64) -> f64,
    ) -> Result<Option<f64>> {
        if !self.has_elevation_data() {
            return Err(TrackError::MissingData {
                field: "elevation",
                operation,
            });
        }
        self.compute_points_ascent_rate();
        Ok(self.points().filter_map(|p| p.ascent_rate).reduce(pick))
    }

    /// Minimum per-point ascent speed (m/h).
    pub fn min_ascent_speed(&mut self) -> Result<Option<f64>> {
        self.ascent_speed_extreme("min_ascent_speed", f64::min)
    }

    /// Maximum per-point ascent speed (m/h).
    pub fn max_ascent_speed(&mut self) -> Result<Option<f64>> {
        self.ascent_speed_extreme("max_ascent_speed", f64::max)
    }

    fn ascent_speed_extreme(
        &mut self,
        operation: &'static str,
        pick: impl Fn(f64, f64) -> f64,
    ) -> Result<Option<f64>> {
        if !self.has_elevation_data() {
            return Err(TrackError::MissingData {
                field: "elevation",
                operation,
            });
        }
        if !self.has_time_data() {
            return Err(TrackError::MissingData {
                field: "time",
                operation,
            });
        }
        self.compute_points_ascent_speed();
        Ok(self.points().filter_map(|p| p.ascent_speed).reduce(pick))
    }
}

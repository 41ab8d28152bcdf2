//! Tests for kinematic analysis

use chrono::{Duration, TimeZone, Utc};
use trackkit::{Gpx, GpxVersion, Point, Segment, Track, TrackError};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn single_track(points: Vec<Point>) -> Gpx {
    let mut document = Gpx::new(GpxVersion::V1_1, "test");
    document.tracks.push(Track {
        name: None,
        track_type: None,
        segments: vec![Segment::from_points(points)],
    });
    document
}

/// ~100 m in 36 s, then standing still for 60 s.
fn walk_then_stop() -> Gpx {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    // 0.0009 degrees of latitude is ~100 m
    let mut a = Point::with_time(51.0, 0.0, t0);
    a.elevation = Some(100.0);
    let mut b = Point::with_time(51.0009, 0.0, t0 + Duration::seconds(36));
    b.elevation = Some(110.0);
    let mut c = Point::with_time(51.0009, 0.0, t0 + Duration::seconds(96));
    c.elevation = Some(110.0);
    single_track(vec![a, b, c])
}

#[test]
fn test_distance() {
    let mut document = walk_then_stop();
    let distance = document.distance();
    assert!(approx_eq(distance, 100.0, 2.0));
    // Cached value is stable
    assert_eq!(document.distance(), distance);
}

#[test]
fn test_avg_speed_is_distance_over_elapsed() {
    let mut document = walk_then_stop();
    let distance = document.distance();
    let elapsed = document.total_elapsed_time().unwrap();
    let expected = distance / 1000.0 / (elapsed / 3600.0);
    assert!(approx_eq(document.avg_speed().unwrap(), expected, 1e-9));
}

#[test]
fn test_moving_plus_stopped_equals_elapsed() {
    let mut document = walk_then_stop();
    let moving = document.moving_time().unwrap();
    let stopped = document.stopped_time().unwrap();
    let elapsed = document.total_elapsed_time().unwrap();
    assert_eq!(moving + stopped, elapsed);
    // The 36 s leg runs at ~10 km/h, the 60 s leg at 0
    assert!(approx_eq(moving, 36.0, 1e-9));
    assert!(approx_eq(stopped, 60.0, 1e-9));
}

#[test]
fn test_avg_moving_speed_excludes_stops() {
    let mut document = walk_then_stop();
    let moving_speed = document.avg_moving_speed().unwrap();
    let overall = document.avg_speed().unwrap();
    assert!(moving_speed > overall);
    // ~100 m over 36 s of movement is ~10 km/h
    assert!(approx_eq(moving_speed, 10.0, 0.5));
}

#[test]
fn test_ascent_descent_telescoping() {
    let mut points = Vec::new();
    for (i, ele) in [100.0, 120.0, 110.0, 130.0].iter().enumerate() {
        points.push(Point::with_elevation(51.0 + i as f64 * 0.001, 0.0, *ele));
    }
    let mut document = single_track(points);

    let ascent = document.ascent().unwrap();
    let descent = document.descent().unwrap();
    assert!(approx_eq(ascent, 40.0, 1e-9));
    assert!(approx_eq(descent, 10.0, 1e-9));
    // Net elevation change equals last minus first
    assert!(approx_eq(ascent - descent, 30.0, 1e-9));
}

#[test]
fn test_ascent_skips_points_without_elevation() {
    let mut document = single_track(vec![
        Point::with_elevation(51.0, 0.0, 100.0),
        Point::new(51.001, 0.0),
        Point::with_elevation(51.002, 0.0, 105.0),
    ]);
    // The gap does not contribute a phantom drop to zero
    assert!(approx_eq(document.ascent().unwrap(), 5.0, 1e-9));
    assert!(approx_eq(document.descent().unwrap(), 0.0, 1e-9));
}

#[test]
fn test_ascent_without_any_elevation_is_missing_data() {
    let mut document = single_track(vec![Point::new(51.0, 0.0), Point::new(51.001, 0.0)]);
    let err = document.ascent().unwrap_err();
    assert!(matches!(
        err,
        TrackError::MissingData {
            field: "elevation",
            ..
        }
    ));
}

#[test]
fn test_min_max_elevation() {
    let document = single_track(vec![
        Point::with_elevation(51.0, 0.0, 100.0),
        Point::with_elevation(51.001, 0.0, 130.0),
        Point::with_elevation(51.002, 0.0, 95.0),
    ]);
    assert_eq!(document.min_elevation().unwrap(), 95.0);
    assert_eq!(document.max_elevation().unwrap(), 130.0);
}

#[test]
fn test_start_and_stop_time() {
    let document = walk_then_stop();
    let start = document.start_time().unwrap();
    let stop = document.stop_time().unwrap();
    assert_eq!((stop - start).num_seconds(), 96);
}

#[test]
fn test_time_aggregates_without_timestamps_are_missing_data() {
    let mut document = single_track(vec![Point::new(51.0, 0.0), Point::new(51.001, 0.0)]);
    assert!(matches!(
        document.moving_time().unwrap_err(),
        TrackError::MissingData { field: "time", .. }
    ));
    assert!(matches!(
        document.start_time().unwrap_err(),
        TrackError::MissingData { field: "time", .. }
    ));
    assert!(matches!(
        document.max_speed().unwrap_err(),
        TrackError::MissingData { field: "time", .. }
    ));
}

#[test]
fn test_max_speed_is_none_when_all_intervals_undefined() {
    // Timestamps exist but every interval has zero duration, so no speed
    // is defined anywhere: that is Ok(None), not an error
    let t = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let mut document = single_track(vec![
        Point::with_time(51.0, 0.0, t),
        Point::with_time(51.001, 0.0, t),
    ]);
    assert_eq!(document.max_speed().unwrap(), None);
    assert_eq!(document.min_speed().unwrap(), None);
}

#[test]
fn test_max_speed_over_series() {
    let mut document = walk_then_stop();
    let max = document.max_speed().unwrap().unwrap();
    assert!(approx_eq(max, 10.0, 0.5));
    let min = document.min_speed().unwrap().unwrap();
    assert!(approx_eq(min, 0.0, 1e-9));
}

#[test]
fn test_per_point_series_first_point_is_none() {
    let mut document = walk_then_stop();
    document.compute_points_speed();
    document.compute_points_distance();
    let points: Vec<&Point> = document.points().collect();
    assert!(points[0].speed.is_none());
    assert!(points[0].distance_from_previous.is_none());
    assert!(points[1].speed.is_some());
    assert!(approx_eq(points[1].distance_from_previous.unwrap(), 100.0, 2.0));
}

#[test]
fn test_series_does_not_cross_segment_boundaries() {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let mut document = Gpx::new(GpxVersion::V1_1, "test");
    document.tracks.push(Track {
        name: None,
        track_type: None,
        segments: vec![
            Segment::from_points(vec![
                Point::with_time(51.0, 0.0, t0),
                Point::with_time(51.001, 0.0, t0 + Duration::seconds(30)),
            ]),
            Segment::from_points(vec![
                Point::with_time(52.0, 0.0, t0 + Duration::seconds(60)),
                Point::with_time(52.001, 0.0, t0 + Duration::seconds(90)),
            ]),
        ],
    });
    document.compute_points_speed();
    let points: Vec<&Point> = document.points().collect();
    // First point of the second segment has no predecessor
    assert!(points[2].speed.is_none());
}

#[test]
fn test_negative_time_delta_yields_no_speed() {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let mut document = single_track(vec![
        Point::with_time(51.0, 0.0, t0),
        // Recorded out of order
        Point::with_time(51.001, 0.0, t0 - Duration::seconds(30)),
    ]);
    document.compute_points_speed();
    assert!(document.points().all(|p| p.speed.is_none()));
}

#[test]
fn test_pace_and_speed_are_consistent() {
    let mut document = walk_then_stop();
    document.compute_points_speed();
    document.compute_points_pace();
    let points: Vec<&Point> = document.points().collect();
    let speed = points[1].speed.unwrap();
    let pace = points[1].pace.unwrap();
    // pace (min/km) is 60 / speed (km/h)
    assert!(approx_eq(pace * speed, 60.0, 1e-6));
}

#[test]
fn test_ascent_rate_series() {
    let mut document = walk_then_stop();
    document.compute_points_ascent_rate();
    let points: Vec<&Point> = document.points().collect();
    // 10 m up over ~100 m is a ~10% grade
    assert!(approx_eq(points[1].ascent_rate.unwrap(), 10.0, 0.5));
}

#[test]
fn test_has_data_flags() {
    let document = walk_then_stop();
    assert!(document.has_elevation_data());
    assert!(document.has_time_data());

    let bare = single_track(vec![Point::new(51.0, 0.0)]);
    assert!(!bare.has_elevation_data());
    assert!(!bare.has_time_data());
}

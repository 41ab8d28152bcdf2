//! # trackkit
//!
//! GPS activity toolkit for fitness and mapping applications.
//!
//! This library provides:
//! - Decoding of GPX 1.0/1.1, KML 2.2, KMZ and FIT recordings into one
//!   unified document model
//! - Kinematic and geometric analysis (distance, ascent, speed, pace,
//!   moving time) with lazy caching
//! - Ramer-Douglas-Peucker simplification and GPS-spike removal
//! - Deterministic GPX/KML encoding plus CSV and tabular projections
//! - Opt-in schema validation against the GPX 1.0/1.1 and KML 2.2
//!   topologies
//!
//! ## Quick Start
//!
//! ```rust
//! use trackkit::{decode, DecodeOptions};
//!
//! let gpx = br#"<?xml version="1.0" encoding="UTF-8"?>
//! <gpx version="1.1" creator="example" xmlns="http://www.topografix.com/GPX/1/1">
//!   <trk><trkseg>
//!     <trkpt lat="51.5074" lon="-0.1278"><ele>11.0</ele></trkpt>
//!     <trkpt lat="51.5080" lon="-0.1290"><ele>12.5</ele></trkpt>
//!   </trkseg></trk>
//! </gpx>"#;
//!
//! let mut document = decode(gpx, &DecodeOptions::default()).unwrap();
//! assert_eq!(document.point_count(), 2);
//! assert!(document.distance() > 0.0);
//! ```

// Unified error handling
pub mod error;
pub use error::{Result, TrackError};

// Geographic utilities (distance, bearing, bounds, center calculations)
pub mod geo_utils;

// The track data model
pub mod model;
pub use model::{
    Bounds, Extensions, Gpx, GpxVersion, Metadata, Point, Precision, Route, Segment, TimeFormat,
    Track, Waypoint,
};

// Format codecs (GPX, KML/KMZ, FIT decode; GPX/KML/CSV encode)
pub mod formats;
pub use formats::{decode, decode_as, detect, encode, DecodeOptions, Format};

// Schema topology validation (GPX 1.0/1.1, KML 2.2)
pub mod schema;

// Kinematics: derived series and cached aggregates
pub mod analysis;
pub use analysis::DEFAULT_MOVING_SPEED;

// Simplification and GPS-error cleanup
pub mod simplify;
pub use simplify::{DEFAULT_ERROR_SPEED, DEFAULT_MIN_SPACING, DEFAULT_SIMPLIFY_TOLERANCE};

// Tabular projection for dataframe-style consumers
pub mod tabular;
pub use tabular::{Field, Table, Value};

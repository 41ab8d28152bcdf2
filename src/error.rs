//! Unified error handling for the crate.
//!
//! Every fallible operation returns [`Result`], with [`TrackError`] covering
//! the full taxonomy: malformed input bytes, schema violations, operations a
//! source format cannot support, and aggregate computations whose required
//! data is absent from the whole document.

use thiserror::Error;

/// Errors produced by decoding, validation, encoding and analysis.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The byte stream is not a well-formed document of the expected format.
    ///
    /// No partial document is ever returned alongside this error.
    #[error("parse error ({format}): {reason}")]
    Parse {
        /// Format that was being decoded ("gpx", "kml", "kmz", "fit").
        format: &'static str,
        /// Human-readable description of what was malformed.
        reason: String,
    },

    /// A document violated the named schema.
    #[error("schema violation ({schema}): <{element}>: {constraint}")]
    Schema {
        /// Schema identifier, e.g. "gpx/1.1" or "kml/2.2".
        schema: &'static str,
        /// Element (or element/attribute pair) at fault.
        element: String,
        /// The violated constraint.
        constraint: String,
    },

    /// The requested operation is not supported for this document's source.
    #[error("unsupported operation: {operation} ({reason})")]
    Unsupported {
        operation: &'static str,
        reason: String,
    },

    /// A whole-document aggregate was requested but no point in the document
    /// carries the field it needs (e.g. speed without any timestamps).
    #[error("no point in the document carries {field} data, required by {operation}")]
    MissingData {
        field: &'static str,
        operation: &'static str,
    },

    /// Underlying I/O failure while reading an archive member.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackError {
    /// Shorthand for a [`TrackError::Parse`] with an owned reason.
    pub fn parse(format: &'static str, reason: impl Into<String>) -> Self {
        Self::Parse {
            format,
            reason: reason.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TrackError>;

//! Format codecs: byte-stream detection, decode dispatch and encode
//! dispatch.
//!
//! Supported inputs: GPX 1.0/1.1, KML 2.2, KMZ (zip-wrapped KML) and FIT.
//! Supported outputs: GPX and KML (plus the CSV/tabular projections in
//! [`csv`](crate::formats::csv_export) and [`crate::tabular`]). FIT and KMZ
//! are decode-only.

pub mod csv_export;
pub mod fit;
pub mod gpx;
pub mod kml;

use log::debug;

use crate::error::{Result, TrackError};
use crate::model::Gpx;

/// External representations the codecs understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Gpx,
    Kml,
    Kmz,
    Fit,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Gpx => "gpx",
            Format::Kml => "kml",
            Format::Kmz => "kmz",
            Format::Fit => "fit",
        }
    }
}

/// Decode-time options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Validate the document against its declared schema (GPX 1.0/1.1 or
    /// KML 2.2). Off by default; decode never validates unless asked.
    pub schema_validation: bool,
    /// Additionally check `<extensions>` content against the known
    /// extension schemas. Only meaningful with `schema_validation`.
    pub extension_schemas: bool,
}

impl DecodeOptions {
    /// Options with schema validation enabled.
    pub fn validating() -> Self {
        Self {
            schema_validation: true,
            extension_schemas: false,
        }
    }
}

/// Sniff the format of a byte stream.
///
/// Recognizes the zip magic (KMZ), the FIT header tag, and XML documents by
/// their root element. Returns `None` for anything else.
pub fn detect(bytes: &[u8]) -> Option<Format> {
    if bytes.starts_with(b"PK\x03\x04") {
        return Some(Format::Kmz);
    }
    // FIT header: byte 8..12 carry the ".FIT" data-type tag.
    if bytes.len() >= 12 && &bytes[8..12] == b".FIT" {
        return Some(Format::Fit);
    }

    // XML: look at the first root element within a bounded prefix.
    let prefix = &bytes[..bytes.len().min(2048)];
    let text = String::from_utf8_lossy(prefix);
    for chunk in text.split('<').skip(1) {
        if chunk.starts_with('?') || chunk.starts_with('!') {
            continue;
        }
        if chunk.starts_with("gpx") {
            return Some(Format::Gpx);
        }
        if chunk.starts_with("kml") {
            return Some(Format::Kml);
        }
        break;
    }
    None
}

/// Detect the format of `bytes` and decode into a document.
pub fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<Gpx> {
    let format = detect(bytes).ok_or_else(|| {
        TrackError::parse("unknown", "unrecognized input: not GPX, KML, KMZ or FIT")
    })?;
    debug!("detected input format: {}", format.as_str());
    decode_as(bytes, format, options)
}

/// Decode `bytes` as a specific format.
pub fn decode_as(bytes: &[u8], format: Format, options: &DecodeOptions) -> Result<Gpx> {
    match format {
        Format::Gpx => gpx::decode(bytes, options),
        Format::Kml => kml::decode(bytes, options),
        Format::Kmz => kml::decode_kmz(bytes, options),
        Format::Fit => fit::decode(bytes),
    }
}

/// Serialize a document to the requested output format.
///
/// FIT and KMZ are decode-only; requesting them fails with
/// [`TrackError::Unsupported`].
pub fn encode(document: &Gpx, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Gpx => gpx::encode(document).map(String::into_bytes),
        Format::Kml => kml::encode(document).map(String::into_bytes),
        Format::Fit => Err(TrackError::Unsupported {
            operation: "encode to FIT",
            reason: "FIT is a decode-only format in this crate".to_string(),
        }),
        Format::Kmz => Err(TrackError::Unsupported {
            operation: "encode to KMZ",
            reason: "KMZ archives are decode-only; encode to KML instead".to_string(),
        }),
    }
}

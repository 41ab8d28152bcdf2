//! GPX 1.0/1.1 codec.
//!
//! Decoding is an event-driven pass over the XML: unknown elements outside
//! `<extensions>` are skipped structurally (schema validation, when
//! requested, reports them), while `<extensions>` content is captured
//! verbatim and round-trips untouched. The decimal precision of coordinates
//! and the timestamp layout of the source are recorded so that encoding
//! reproduces the source formatting.
//!
//! Encoding is deterministic: fixed attribute order on the root element and
//! fixed element order throughout, so encoding the same document twice
//! yields identical bytes.

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, TrackError};
use crate::formats::DecodeOptions;
use crate::model::{
    Bounds, Extensions, Gpx, GpxVersion, Metadata, Point, Precision, Route, Segment, TimeFormat,
    Track, Waypoint,
};
use crate::schema;

/// Decode a GPX byte stream.
///
/// Fails with [`TrackError::Parse`] on malformed XML or a missing/unknown
/// `version`/`creator` attribute. Schema validation runs only when enabled
/// in `options` and surfaces as [`TrackError::Schema`].
pub fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<Gpx> {
    let xml = std::str::from_utf8(bytes)
        .map_err(|e| TrackError::parse("gpx", format!("input is not valid UTF-8: {e}")))?;

    let document = parse(xml)?;

    if options.schema_validation {
        schema::validate_gpx(xml, document.version)?;
        if options.extension_schemas {
            schema::validate_gpx_extensions(xml)?;
        }
    }

    Ok(document)
}

/// Serialize a document as GPX XML using its recorded version, precision
/// and time format.
pub fn encode(document: &Gpx) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let version = document.version;
    let mut root = BytesStart::new("gpx");
    root.push_attribute(("version", version.as_str()));
    root.push_attribute(("creator", document.creator.as_str()));
    root.push_attribute(("xmlns", version.namespace()));
    root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    root.push_attribute((
        "xsi:schemaLocation",
        format!("{} {}/gpx.xsd", version.namespace(), version.namespace()).as_str(),
    ));
    writer.write_event(Event::Start(root))?;

    let precision = document.precision;
    if let Some(metadata) = &document.metadata {
        match version {
            GpxVersion::V1_1 => write_metadata(&mut writer, metadata, &precision)?,
            // GPX 1.0 carries the metadata fields directly under the root.
            GpxVersion::V1_0 => write_metadata_fields(&mut writer, metadata, &precision, false)?,
        }
    }

    for waypoint in &document.waypoints {
        write_waypoint(&mut writer, "wpt", waypoint, &precision)?;
    }

    for route in &document.routes {
        writer.write_event(Event::Start(BytesStart::new("rte")))?;
        if let Some(name) = &route.name {
            write_text_element(&mut writer, "name", name)?;
        }
        if let Some(desc) = &route.description {
            write_text_element(&mut writer, "desc", desc)?;
        }
        for point in &route.points {
            write_point(&mut writer, "rtept", point, &precision)?;
        }
        writer.write_event(Event::End(BytesEnd::new("rte")))?;
    }

    for track in &document.tracks {
        writer.write_event(Event::Start(BytesStart::new("trk")))?;
        if let Some(name) = &track.name {
            write_text_element(&mut writer, "name", name)?;
        }
        if let Some(track_type) = &track.track_type {
            write_text_element(&mut writer, "type", track_type)?;
        }
        for segment in &track.segments {
            writer.write_event(Event::Start(BytesStart::new("trkseg")))?;
            for point in &segment.points {
                write_point(&mut writer, "trkpt", point, &precision)?;
            }
            writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("trk")))?;
    }

    // <extensions> only exists in the 1.1 schema.
    if version == GpxVersion::V1_1 {
        if let Some(extensions) = &document.extensions {
            write_extensions(&mut writer, extensions)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| TrackError::parse("gpx", format!("encoded output is not UTF-8: {e}")))
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Running record of the formatting observed while parsing.
#[derive(Debug, Default)]
struct FormatObserver {
    lat_lon: Option<usize>,
    elevation: Option<usize>,
    fractional_time: bool,
}

impl FormatObserver {
    fn observe_coordinate(&mut self, text: &str) {
        let decimals = decimal_places(text);
        self.lat_lon = Some(self.lat_lon.map_or(decimals, |d| d.max(decimals)));
    }

    fn observe_elevation(&mut self, text: &str) {
        let decimals = decimal_places(text);
        self.elevation = Some(self.elevation.map_or(decimals, |d| d.max(decimals)));
    }

    fn observe_time(&mut self, text: &str) {
        if text.contains('.') {
            self.fractional_time = true;
        }
    }

    fn into_precision(self) -> Precision {
        let default = Precision::default();
        Precision {
            lat_lon: self.lat_lon.unwrap_or(default.lat_lon),
            elevation: self.elevation.unwrap_or(default.elevation),
            time: if self.fractional_time {
                TimeFormat::Fractional
            } else {
                TimeFormat::Seconds
            },
        }
    }
}

fn decimal_places(text: &str) -> usize {
    text.trim()
        .split_once('.')
        .map_or(0, |(_, decimals)| decimals.len())
}

fn parse(xml: &str) -> Result<Gpx> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut observer = FormatObserver::default();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.local_name().as_ref() == b"gpx" => {
                return parse_gpx(&mut reader, &e, &mut observer);
            }
            Event::Eof => {
                return Err(TrackError::parse("gpx", "no <gpx> root element found"));
            }
            _ => {}
        }
    }
}

fn parse_gpx(
    reader: &mut Reader<&[u8]>,
    root: &BytesStart<'_>,
    observer: &mut FormatObserver,
) -> Result<Gpx> {
    let version_attr = attribute(root, b"version")?
        .ok_or_else(|| TrackError::parse("gpx", "missing required 'version' attribute on <gpx>"))?;
    let version = GpxVersion::parse(&version_attr).ok_or_else(|| {
        TrackError::parse("gpx", format!("unsupported GPX version '{version_attr}'"))
    })?;
    let creator = attribute(root, b"creator")?
        .ok_or_else(|| TrackError::parse("gpx", "missing required 'creator' attribute on <gpx>"))?;

    let mut document = Gpx::new(version, creator);
    // Top-level metadata fields of a 1.0 document accumulate here.
    let mut flat_metadata = Metadata::default();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"metadata" => {
                    document.metadata = Some(parse_metadata(reader, &e, observer)?);
                }
                b"name" if version == GpxVersion::V1_0 => {
                    flat_metadata.name = Some(read_text(reader, &e)?);
                }
                b"desc" if version == GpxVersion::V1_0 => {
                    flat_metadata.description = Some(read_text(reader, &e)?);
                }
                b"author" if version == GpxVersion::V1_0 => {
                    flat_metadata.author = Some(read_text(reader, &e)?);
                }
                b"time" if version == GpxVersion::V1_0 => {
                    let text = read_text(reader, &e)?;
                    observer.observe_time(&text);
                    flat_metadata.time = parse_timestamp(&text);
                }
                b"wpt" => {
                    if let Some(waypoint) = parse_waypoint(reader, &e, observer)? {
                        document.waypoints.push(waypoint);
                    }
                }
                b"rte" => document.routes.push(parse_route(reader, observer)?),
                b"trk" => document.tracks.push(parse_track(reader, observer)?),
                b"extensions" => {
                    document.extensions = Some(read_extensions(reader, &e)?);
                }
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"wpt" => {
                    if let Some(point) = point_from_attributes(&e, observer)? {
                        document.waypoints.push(Waypoint::at(point));
                    }
                }
                b"bounds" => {
                    flat_metadata.bounds = parse_bounds_attributes(&e)?;
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"gpx" => break,
            Event::Eof => {
                return Err(TrackError::parse("gpx", "unexpected end of document"));
            }
            _ => {}
        }
    }

    if version == GpxVersion::V1_0 && !flat_metadata.is_empty() {
        document.metadata = Some(flat_metadata);
    }

    document.precision = std::mem::take(observer).into_precision();
    Ok(document)
}

fn parse_metadata(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    observer: &mut FormatObserver,
) -> Result<Metadata> {
    let end = start.to_end().into_owned();
    let mut metadata = Metadata::default();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => metadata.name = Some(read_text(reader, &e)?),
                b"desc" => metadata.description = Some(read_text(reader, &e)?),
                b"author" => metadata.author = Some(parse_author(reader, &e)?),
                b"time" => {
                    let text = read_text(reader, &e)?;
                    observer.observe_time(&text);
                    metadata.time = parse_timestamp(&text);
                }
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"bounds" => {
                metadata.bounds = parse_bounds_attributes(&e)?;
            }
            Event::End(e) if e.name() == end.name() => break,
            Event::Eof => {
                return Err(TrackError::parse("gpx", "unterminated <metadata> element"));
            }
            _ => {}
        }
    }

    Ok(metadata)
}

/// A 1.1 `<author>` holds a `<name>` child; 1.0 holds bare text. Accept both.
fn parse_author(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end = start.to_end().into_owned();
    let mut name = String::new();
    // Entity references split bare text into separate events; accumulate the
    // fragments and resolve references as they arrive. Trimming happens once
    // at the end so whitespace between fragments survives.
    reader.config_mut().trim_text(false);
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.local_name().as_ref() == b"name" => {
                name = read_text(reader, &e)?;
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::Text(t) => text.push_str(&t.xml_content().map_err(xml_err)?),
            Event::GeneralRef(r) => {
                if let Some(ch) = r.resolve_char_ref().map_err(xml_err)? {
                    text.push(ch);
                } else {
                    let entity = r.xml_content().map_err(xml_err)?;
                    if let Some(resolved) =
                        quick_xml::escape::resolve_predefined_entity(&entity)
                    {
                        text.push_str(resolved);
                    }
                }
            }
            Event::End(e) if e.name() == end.name() => break,
            Event::Eof => return Err(TrackError::parse("gpx", "unterminated <author> element")),
            _ => {}
        }
    }

    reader.config_mut().trim_text(true);
    if name.is_empty() {
        name = text.trim().to_string();
    }
    Ok(name)
}

fn parse_route(reader: &mut Reader<&[u8]>, observer: &mut FormatObserver) -> Result<Route> {
    let mut route = Route::default();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => route.name = Some(read_text(reader, &e)?),
                b"desc" => route.description = Some(read_text(reader, &e)?),
                b"rtept" => {
                    if let Some(waypoint) = parse_waypoint(reader, &e, observer)? {
                        if let Some(point) = waypoint.point {
                            route.points.push(point);
                        }
                    }
                }
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"rtept" => {
                if let Some(point) = point_from_attributes(&e, observer)? {
                    route.points.push(point);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"rte" => break,
            Event::Eof => return Err(TrackError::parse("gpx", "unterminated <rte> element")),
            _ => {}
        }
    }

    Ok(route)
}

fn parse_track(reader: &mut Reader<&[u8]>, observer: &mut FormatObserver) -> Result<Track> {
    let mut track = Track::default();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => track.name = Some(read_text(reader, &e)?),
                b"type" => track.track_type = Some(read_text(reader, &e)?),
                b"trkseg" => track.segments.push(parse_segment(reader, observer)?),
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.local_name().as_ref() == b"trk" => break,
            Event::Eof => return Err(TrackError::parse("gpx", "unterminated <trk> element")),
            _ => {}
        }
    }

    Ok(track)
}

fn parse_segment(reader: &mut Reader<&[u8]>, observer: &mut FormatObserver) -> Result<Segment> {
    let mut segment = Segment::default();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.local_name().as_ref() == b"trkpt" => {
                if let Some(waypoint) = parse_waypoint(reader, &e, observer)? {
                    if let Some(point) = waypoint.point {
                        segment.points.push(point);
                    }
                }
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::Empty(e) if e.local_name().as_ref() == b"trkpt" => {
                if let Some(point) = point_from_attributes(&e, observer)? {
                    segment.points.push(point);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"trkseg" => break,
            Event::Eof => return Err(TrackError::parse("gpx", "unterminated <trkseg> element")),
            _ => {}
        }
    }

    Ok(segment)
}

/// Parse a `wpt`/`trkpt`/`rtept` element with children.
///
/// A point whose `lat`/`lon` attributes are missing or unparsable is skipped
/// structurally (returns `None`); schema validation is the layer that
/// reports it as an error.
fn parse_waypoint(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    observer: &mut FormatObserver,
) -> Result<Option<Waypoint>> {
    let end = start.to_end().into_owned();

    let point = point_from_attributes(start, observer)?;
    let Some(mut point) = point else {
        // Consume the rest of the element.
        reader.read_to_end(end.name()).map_err(xml_err)?;
        return Ok(None);
    };

    let mut waypoint = Waypoint::default();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text(reader, &e)?;
                    observer.observe_elevation(&text);
                    point.elevation = text.trim().parse::<f64>().ok();
                }
                b"time" => {
                    let text = read_text(reader, &e)?;
                    observer.observe_time(&text);
                    point.time = parse_timestamp(&text);
                }
                b"name" => waypoint.name = Some(read_text(reader, &e)?),
                b"cmt" => waypoint.comment = Some(read_text(reader, &e)?),
                b"desc" => waypoint.description = Some(read_text(reader, &e)?),
                b"sym" => waypoint.symbol = Some(read_text(reader, &e)?),
                b"extensions" => {
                    point.extensions = Some(read_extensions(reader, &e)?);
                }
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.name() == end.name() => break,
            Event::Eof => {
                return Err(TrackError::parse("gpx", "unterminated point element"));
            }
            _ => {}
        }
    }

    waypoint.point = Some(point);
    Ok(Some(waypoint))
}

fn point_from_attributes(
    element: &BytesStart<'_>,
    observer: &mut FormatObserver,
) -> Result<Option<Point>> {
    let lat_text = attribute(element, b"lat")?;
    let lon_text = attribute(element, b"lon")?;

    let (Some(lat_text), Some(lon_text)) = (lat_text, lon_text) else {
        return Ok(None);
    };

    let (Ok(latitude), Ok(longitude)) = (lat_text.trim().parse(), lon_text.trim().parse()) else {
        return Ok(None);
    };

    observer.observe_coordinate(&lat_text);
    observer.observe_coordinate(&lon_text);
    Ok(Some(Point::new(latitude, longitude)))
}

fn parse_bounds_attributes(element: &BytesStart<'_>) -> Result<Option<Bounds>> {
    let corner = |name: &[u8]| -> Option<f64> {
        attribute(element, name)
            .ok()
            .flatten()
            .and_then(|v| v.trim().parse::<f64>().ok())
    };

    let min_lat = corner(b"minlat");
    let min_lon = corner(b"minlon");
    let max_lat = corner(b"maxlat");
    let max_lon = corner(b"maxlon");

    match (min_lat, min_lon, max_lat, max_lon) {
        (Some(min_lat), Some(min_lon), Some(max_lat), Some(max_lon)) => Ok(Some(Bounds {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })),
        _ => Ok(None),
    }
}

/// Capture the inner XML of an `<extensions>` element verbatim.
fn read_extensions(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Extensions> {
    let raw = reader.read_text(start.name()).map_err(xml_err)?;
    Ok(Extensions::new(raw.into_owned()))
}

fn read_text(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    // read_text returns the raw inner slice; entities still need resolving.
    let raw = reader.read_text(start.name()).map_err(xml_err)?;
    let text = quick_xml::escape::unescape(&raw).map_err(xml_err)?;
    Ok(text.trim().to_string())
}

fn skip_element(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<()> {
    reader.read_to_end(start.name()).map_err(xml_err)?;
    Ok(())
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| TrackError::parse("gpx", format!("bad attribute: {e}")))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| TrackError::parse("gpx", format!("bad attribute value: {e}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Parse a GPX timestamp. Accepts the schema's UTC layouts as well as any
/// RFC 3339 offset, normalizing to UTC. Unparsable values are dropped.
pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn xml_err(e: impl std::fmt::Display) -> TrackError {
    TrackError::parse("gpx", format!("malformed XML: {e}"))
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn write_metadata(
    writer: &mut Writer<Vec<u8>>,
    metadata: &Metadata,
    precision: &Precision,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("metadata")))?;
    write_metadata_fields(writer, metadata, precision, true)?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;
    Ok(())
}

fn write_metadata_fields(
    writer: &mut Writer<Vec<u8>>,
    metadata: &Metadata,
    precision: &Precision,
    nested_author: bool,
) -> Result<()> {
    if let Some(name) = &metadata.name {
        write_text_element(writer, "name", name)?;
    }
    if let Some(desc) = &metadata.description {
        write_text_element(writer, "desc", desc)?;
    }
    if let Some(author) = &metadata.author {
        if nested_author {
            writer.write_event(Event::Start(BytesStart::new("author")))?;
            write_text_element(writer, "name", author)?;
            writer.write_event(Event::End(BytesEnd::new("author")))?;
        } else {
            write_text_element(writer, "author", author)?;
        }
    }
    if let Some(time) = &metadata.time {
        write_text_element(writer, "time", &precision.time.format(time))?;
    }
    if let Some(bounds) = &metadata.bounds {
        let mut element = BytesStart::new("bounds");
        element.push_attribute(("minlat", fmt(bounds.min_lat, precision.lat_lon).as_str()));
        element.push_attribute(("minlon", fmt(bounds.min_lon, precision.lat_lon).as_str()));
        element.push_attribute(("maxlat", fmt(bounds.max_lat, precision.lat_lon).as_str()));
        element.push_attribute(("maxlon", fmt(bounds.max_lon, precision.lat_lon).as_str()));
        writer.write_event(Event::Empty(element))?;
    }
    Ok(())
}

fn write_waypoint(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    waypoint: &Waypoint,
    precision: &Precision,
) -> Result<()> {
    let Some(point) = &waypoint.point else {
        return Ok(());
    };

    let mut start = BytesStart::new(tag);
    start.push_attribute(("lat", fmt(point.latitude, precision.lat_lon).as_str()));
    start.push_attribute(("lon", fmt(point.longitude, precision.lat_lon).as_str()));
    writer.write_event(Event::Start(start))?;

    if let Some(elevation) = point.elevation {
        write_text_element(writer, "ele", &fmt(elevation, precision.elevation))?;
    }
    if let Some(time) = &point.time {
        write_text_element(writer, "time", &precision.time.format(time))?;
    }
    if let Some(name) = &waypoint.name {
        write_text_element(writer, "name", name)?;
    }
    if let Some(comment) = &waypoint.comment {
        write_text_element(writer, "cmt", comment)?;
    }
    if let Some(desc) = &waypoint.description {
        write_text_element(writer, "desc", desc)?;
    }
    if let Some(symbol) = &waypoint.symbol {
        write_text_element(writer, "sym", symbol)?;
    }
    if let Some(extensions) = &point.extensions {
        write_extensions(writer, extensions)?;
    }

    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_point(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    point: &Point,
    precision: &Precision,
) -> Result<()> {
    let mut start = BytesStart::new(tag);
    start.push_attribute(("lat", fmt(point.latitude, precision.lat_lon).as_str()));
    start.push_attribute(("lon", fmt(point.longitude, precision.lat_lon).as_str()));

    let empty = point.elevation.is_none() && point.time.is_none() && point.extensions.is_none();
    if empty {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(elevation) = point.elevation {
        write_text_element(writer, "ele", &fmt(elevation, precision.elevation))?;
    }
    if let Some(time) = &point.time {
        write_text_element(writer, "time", &precision.time.format(time))?;
    }
    if let Some(extensions) = &point.extensions {
        write_extensions(writer, extensions)?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_extensions(writer: &mut Writer<Vec<u8>>, extensions: &Extensions) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("extensions")))?;
    // Raw passthrough: the bag is opaque markup captured verbatim on decode.
    writer.write_event(Event::Text(BytesText::from_escaped(extensions.raw.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new("extensions")))?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn fmt(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

//! KML 2.2 / KMZ codec.
//!
//! Only geographic data is extracted: the document name and each
//! `<Placemark>`'s name plus its `<Point>` or `<LineString>` coordinates.
//! Styles, overlays, folders-as-structure and other presentation constructs
//! are dropped. A KMZ is a zip archive wrapping one KML document; decoding
//! fails if the archive holds no KML entry.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, TrackError};
use crate::formats::DecodeOptions;
use crate::model::{Gpx, GpxVersion, Metadata, Point, Segment, Track, Waypoint};
use crate::schema;

/// Creator string stamped on documents converted from KML/KMZ.
const KML_CREATOR: &str = "trackkit (KML import)";

/// Decode a KML byte stream into a document.
pub fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<Gpx> {
    let xml = std::str::from_utf8(bytes)
        .map_err(|e| TrackError::parse("kml", format!("input is not valid UTF-8: {e}")))?;

    let document = parse(xml)?;

    if options.schema_validation {
        schema::validate_kml(xml)?;
    }

    Ok(document)
}

/// Unwrap a KMZ archive and decode the contained KML document.
///
/// Prefers the conventional `doc.kml` entry, otherwise the first entry with
/// a `.kml` extension. Fails with [`TrackError::Parse`] when the archive is
/// unreadable or holds no KML entry.
pub fn decode_kmz(bytes: &[u8], options: &DecodeOptions) -> Result<Gpx> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| TrackError::parse("kmz", format!("failed to open KMZ archive: {e}")))?;

    let mut kml_index = None;
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| TrackError::parse("kmz", format!("failed to read archive entry: {e}")))?;
        let name = entry.name().to_ascii_lowercase();
        if name == "doc.kml" {
            kml_index = Some(i);
            break;
        }
        if name.ends_with(".kml") && kml_index.is_none() {
            kml_index = Some(i);
        }
    }

    let kml_index = kml_index
        .ok_or_else(|| TrackError::parse("kmz", "no KML entry found in KMZ archive"))?;

    let mut entry = archive
        .by_index(kml_index)
        .map_err(|e| TrackError::parse("kmz", format!("failed to read KML from KMZ: {e}")))?;
    let mut content = Vec::new();
    entry.read_to_end(&mut content)?;

    decode(&content, options)
}

/// Serialize the document's tracks, routes and waypoints as KML 2.2.
pub fn encode(document: &Gpx) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut kml = BytesStart::new("kml");
    kml.push_attribute(("xmlns", "http://www.opengis.net/kml/2.2"));
    writer.write_event(Event::Start(kml))?;
    writer.write_event(Event::Start(BytesStart::new("Document")))?;

    if let Some(name) = document.name() {
        write_text_element(&mut writer, "name", name)?;
    }

    let precision = document.precision;
    for waypoint in &document.waypoints {
        let Some(point) = &waypoint.point else {
            continue;
        };
        writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
        if let Some(name) = &waypoint.name {
            write_text_element(&mut writer, "name", name)?;
        }
        if let Some(desc) = &waypoint.description {
            write_text_element(&mut writer, "description", desc)?;
        }
        writer.write_event(Event::Start(BytesStart::new("Point")))?;
        write_text_element(
            &mut writer,
            "coordinates",
            &coordinate_tuple(point, precision.lat_lon, precision.elevation),
        )?;
        writer.write_event(Event::End(BytesEnd::new("Point")))?;
        writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    }

    for route in &document.routes {
        write_line_placemark(
            &mut writer,
            route.name.as_deref(),
            &route.points,
            precision.lat_lon,
            precision.elevation,
        )?;
    }

    for track in &document.tracks {
        for segment in &track.segments {
            write_line_placemark(
                &mut writer,
                track.name.as_deref(),
                &segment.points,
                precision.lat_lon,
                precision.elevation,
            )?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("Document")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| TrackError::parse("kml", format!("encoded output is not UTF-8: {e}")))
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn parse(xml: &str) -> Result<Gpx> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = Gpx::new(GpxVersion::V1_1, KML_CREATOR);
    let mut saw_kml_root = false;
    let mut document_name: Option<String> = None;
    // Only a <name> that is a direct child of <Document> becomes the
    // document name; a nested container's (e.g. <Folder>) name does not.
    let mut in_document = false;
    let mut document_depth = 0usize;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"kml" => saw_kml_root = true,
                b"Document" if !in_document => in_document = true,
                b"name" if in_document && document_depth == 0 && document_name.is_none() => {
                    document_name = Some(read_text(&mut reader, &e)?);
                }
                b"Placemark" => {
                    parse_placemark(&mut reader, &mut document)?;
                }
                _ if in_document => document_depth += 1,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"Document" => in_document = false,
                _ if in_document => document_depth = document_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_kml_root {
        return Err(TrackError::parse("kml", "no <kml> root element found"));
    }

    if let Some(name) = document_name {
        document.metadata = Some(Metadata {
            name: Some(name),
            ..Metadata::default()
        });
    }

    Ok(document)
}

fn parse_placemark(reader: &mut Reader<&[u8]>, document: &mut Gpx) -> Result<()> {
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut point_coords: Option<Vec<Point>> = None;
    let mut line_coords: Option<Vec<Point>> = None;

    enum Geometry {
        None,
        Point,
        Line,
    }
    let mut geometry = Geometry::None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => name = Some(read_text(reader, &e)?),
                b"description" => description = Some(read_text(reader, &e)?),
                b"Point" => geometry = Geometry::Point,
                b"LineString" => geometry = Geometry::Line,
                b"coordinates" => {
                    let text = read_text(reader, &e)?;
                    let points = parse_coordinates(&text)?;
                    match geometry {
                        Geometry::Point => point_coords = Some(points),
                        Geometry::Line => line_coords = Some(points),
                        // Polygons, rings and other geometry are dropped.
                        Geometry::None => {}
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"Placemark" => break,
            Event::Eof => {
                return Err(TrackError::parse("kml", "unterminated <Placemark> element"));
            }
            _ => {}
        }
    }

    if let Some(points) = point_coords {
        if let Some(point) = points.into_iter().next() {
            document.waypoints.push(Waypoint {
                point: Some(point),
                name: name.clone(),
                description: description.clone(),
                ..Waypoint::default()
            });
        }
    }
    if let Some(points) = line_coords {
        document.tracks.push(Track {
            name,
            track_type: None,
            segments: vec![Segment::from_points(points)],
        });
    }

    Ok(())
}

/// Parse a KML coordinates blob: whitespace-separated `lon,lat[,alt]`
/// tuples.
fn parse_coordinates(text: &str) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    for tuple in text.split_whitespace() {
        let mut parts = tuple.split(',');
        let lon = parts.next().map(str::trim).unwrap_or("");
        let lat = parts.next().map(str::trim).unwrap_or("");
        let (Ok(longitude), Ok(latitude)) = (lon.parse::<f64>(), lat.parse::<f64>()) else {
            return Err(TrackError::parse(
                "kml",
                format!("bad coordinate tuple '{tuple}'"),
            ));
        };
        let mut point = Point::new(latitude, longitude);
        if let Some(alt) = parts.next() {
            point.elevation = alt.trim().parse::<f64>().ok();
        }
        points.push(point);
    }
    Ok(points)
}

fn read_text(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    // read_text returns the raw inner slice; entities still need resolving.
    let raw = reader.read_text(start.name()).map_err(xml_err)?;
    let text = quick_xml::escape::unescape(&raw).map_err(xml_err)?;
    Ok(text.trim().to_string())
}

fn xml_err(e: impl std::fmt::Display) -> TrackError {
    TrackError::parse("kml", format!("malformed XML: {e}"))
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn write_line_placemark(
    writer: &mut Writer<Vec<u8>>,
    name: Option<&str>,
    points: &[Point],
    lat_lon_decimals: usize,
    elevation_decimals: usize,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
    if let Some(name) = name {
        write_text_element(writer, "name", name)?;
    }
    writer.write_event(Event::Start(BytesStart::new("LineString")))?;
    let coordinates = points
        .iter()
        .map(|p| coordinate_tuple(p, lat_lon_decimals, elevation_decimals))
        .collect::<Vec<_>>()
        .join(" ");
    write_text_element(writer, "coordinates", &coordinates)?;
    writer.write_event(Event::End(BytesEnd::new("LineString")))?;
    writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    Ok(())
}

fn coordinate_tuple(point: &Point, lat_lon_decimals: usize, elevation_decimals: usize) -> String {
    match point.elevation {
        Some(elevation) => format!(
            "{:.lon$},{:.lon$},{:.ele$}",
            point.longitude,
            point.latitude,
            elevation,
            lon = lat_lon_decimals,
            ele = elevation_decimals,
        ),
        None => format!(
            "{:.lon$},{:.lon$}",
            point.longitude,
            point.latitude,
            lon = lat_lon_decimals,
        ),
    }
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

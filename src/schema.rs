//! Schema validation for GPX 1.0/1.1 and KML 2.2.
//!
//! The reference schemas are bundled as static topology tables derived from
//! the Topografix GPX schemas and the OGC KML 2.2 schema: per element, the
//! children it may contain and the attributes it must carry, plus content
//! checks for decimal and timestamp leaves. Validation walks the raw XML
//! independently of decoding and reports the first violation as
//! [`TrackError::Schema`], naming the schema and the violated constraint.
//!
//! Validation never runs unless explicitly requested (see
//! [`crate::formats::DecodeOptions`]).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, TrackError};
use crate::formats::gpx::parse_timestamp;
use crate::model::GpxVersion;

/// Allowed children and required attributes for one element.
struct ElementRule {
    name: &'static str,
    required_attributes: &'static [&'static str],
    children: &'static [&'static str],
}

/// Topology of the GPX 1.1 schema (http://www.topografix.com/GPX/1/1).
static GPX_1_1: &[ElementRule] = &[
    ElementRule {
        name: "gpx",
        required_attributes: &["version", "creator"],
        children: &["metadata", "wpt", "rte", "trk", "extensions"],
    },
    ElementRule {
        name: "metadata",
        required_attributes: &[],
        children: &[
            "name", "desc", "author", "copyright", "link", "time", "keywords", "bounds",
            "extensions",
        ],
    },
    ElementRule {
        name: "author",
        required_attributes: &[],
        children: &["name", "email", "link"],
    },
    ElementRule {
        name: "link",
        required_attributes: &["href"],
        children: &["text", "type"],
    },
    ElementRule {
        name: "bounds",
        required_attributes: &["minlat", "minlon", "maxlat", "maxlon"],
        children: &[],
    },
    ElementRule {
        name: "wpt",
        required_attributes: &["lat", "lon"],
        children: WPT_CHILDREN_1_1,
    },
    ElementRule {
        name: "rte",
        required_attributes: &[],
        children: &[
            "name", "cmt", "desc", "src", "link", "number", "type", "extensions", "rtept",
        ],
    },
    ElementRule {
        name: "rtept",
        required_attributes: &["lat", "lon"],
        children: WPT_CHILDREN_1_1,
    },
    ElementRule {
        name: "trk",
        required_attributes: &[],
        children: &[
            "name", "cmt", "desc", "src", "link", "number", "type", "extensions", "trkseg",
        ],
    },
    ElementRule {
        name: "trkseg",
        required_attributes: &[],
        children: &["trkpt", "extensions"],
    },
    ElementRule {
        name: "trkpt",
        required_attributes: &["lat", "lon"],
        children: WPT_CHILDREN_1_1,
    },
];

static WPT_CHILDREN_1_1: &[&str] = &[
    "ele",
    "time",
    "magvar",
    "geoidheight",
    "name",
    "cmt",
    "desc",
    "src",
    "link",
    "sym",
    "type",
    "fix",
    "sat",
    "hdop",
    "vdop",
    "pdop",
    "ageofdgpsdata",
    "dgpsid",
    "extensions",
];

/// Topology of the GPX 1.0 schema. Metadata fields live directly under the
/// root and there is no `<extensions>` element anywhere.
static GPX_1_0: &[ElementRule] = &[
    ElementRule {
        name: "gpx",
        required_attributes: &["version", "creator"],
        children: &[
            "name", "desc", "author", "email", "url", "urlname", "time", "keywords", "bounds",
            "wpt", "rte", "trk",
        ],
    },
    ElementRule {
        name: "bounds",
        required_attributes: &["minlat", "minlon", "maxlat", "maxlon"],
        children: &[],
    },
    ElementRule {
        name: "wpt",
        required_attributes: &["lat", "lon"],
        children: WPT_CHILDREN_1_0,
    },
    ElementRule {
        name: "rte",
        required_attributes: &[],
        children: &[
            "name", "cmt", "desc", "src", "url", "urlname", "number", "rtept",
        ],
    },
    ElementRule {
        name: "rtept",
        required_attributes: &["lat", "lon"],
        children: WPT_CHILDREN_1_0,
    },
    ElementRule {
        name: "trk",
        required_attributes: &[],
        children: &[
            "name", "cmt", "desc", "src", "url", "urlname", "number", "trkseg",
        ],
    },
    ElementRule {
        name: "trkseg",
        required_attributes: &[],
        children: &["trkpt"],
    },
    ElementRule {
        name: "trkpt",
        required_attributes: &["lat", "lon"],
        children: WPT_CHILDREN_1_0,
    },
];

static WPT_CHILDREN_1_0: &[&str] = &[
    "ele",
    "time",
    "magvar",
    "geoidheight",
    "name",
    "cmt",
    "desc",
    "src",
    "url",
    "urlname",
    "sym",
    "type",
    "fix",
    "sat",
    "hdop",
    "vdop",
    "pdop",
    "ageofdgpsdata",
    "dgpsid",
];

/// Elements whose text content must be a decimal number.
static DECIMAL_CONTENT: &[&str] = &[
    "ele",
    "magvar",
    "geoidheight",
    "hdop",
    "vdop",
    "pdop",
    "ageofdgpsdata",
];

/// Elements of KML 2.2 a `<Placemark>` may contain.
static PLACEMARK_CHILDREN: &[&str] = &[
    "name",
    "visibility",
    "open",
    "address",
    "phoneNumber",
    "Snippet",
    "snippet",
    "description",
    "LookAt",
    "Camera",
    "TimeStamp",
    "TimeSpan",
    "styleUrl",
    "Style",
    "StyleMap",
    "Region",
    "Metadata",
    "ExtendedData",
    "Point",
    "LineString",
    "LinearRing",
    "Polygon",
    "MultiGeometry",
    "Model",
];

/// Validate a GPX document against the topology of its declared version.
pub fn validate_gpx(xml: &str, version: GpxVersion) -> Result<()> {
    let (schema, table) = match version {
        GpxVersion::V1_0 => ("gpx/1.0", GPX_1_0),
        GpxVersion::V1_1 => ("gpx/1.1", GPX_1_1),
    };
    walk_gpx(xml, schema, table, version)
}

/// Check `<extensions>` content against the known extension conventions:
/// every element directly under an extension bag must be namespace-qualified.
pub fn validate_gpx_extensions(xml: &str) -> Result<()> {
    const SCHEMA: &str = "gpx/extensions";
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Open-element depth within the current <extensions> subtree; direct
    // children of the bag are at depth 1.
    let mut depth = 0usize;

    loop {
        match reader.read_event().map_err(|e| xml_schema_err(SCHEMA, e))? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if depth > 0 {
                    if depth == 1 && !name.contains(':') {
                        return Err(TrackError::Schema {
                            schema: SCHEMA,
                            element: name,
                            constraint: "extension elements must be namespace-qualified"
                                .to_string(),
                        });
                    }
                    depth += 1;
                } else if e.local_name().as_ref() == b"extensions" {
                    depth = 1;
                }
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if depth == 1 && !name.contains(':') {
                    return Err(TrackError::Schema {
                        schema: SCHEMA,
                        element: name,
                        constraint: "extension elements must be namespace-qualified".to_string(),
                    });
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

/// Validate a KML document: `<kml>` root, known `<Placemark>` children, and
/// well-formed coordinate tuples.
pub fn validate_kml(xml: &str) -> Result<()> {
    const SCHEMA: &str = "kml/2.2";
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;

    loop {
        let event = reader.read_event().map_err(|e| xml_schema_err(SCHEMA, e))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = local_name(e);
                if stack.is_empty() && name != "kml" {
                    return Err(TrackError::Schema {
                        schema: SCHEMA,
                        element: name,
                        constraint: "document root must be <kml>".to_string(),
                    });
                }
                if name == "kml" && stack.is_empty() {
                    saw_root = true;
                }
                if stack.last().is_some_and(|parent| parent == "Placemark")
                    && !PLACEMARK_CHILDREN.contains(&name.as_str())
                {
                    return Err(TrackError::Schema {
                        schema: SCHEMA,
                        element: format!("Placemark/{name}"),
                        constraint: "element not allowed inside <Placemark>".to_string(),
                    });
                }
                if !is_empty {
                    stack.push(name);
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(t) => {
                if stack.last().is_some_and(|top| top == "coordinates") {
                    let text = t.xml_content().map_err(|e| xml_schema_err(SCHEMA, e))?;
                    for tuple in text.split_whitespace() {
                        let ok = {
                            let mut parts = tuple.split(',');
                            let lon = parts.next().and_then(|v| v.trim().parse::<f64>().ok());
                            let lat = parts.next().and_then(|v| v.trim().parse::<f64>().ok());
                            lon.is_some() && lat.is_some()
                        };
                        if !ok {
                            return Err(TrackError::Schema {
                                schema: SCHEMA,
                                element: "coordinates".to_string(),
                                constraint: format!("malformed coordinate tuple '{tuple}'"),
                            });
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(TrackError::Schema {
            schema: SCHEMA,
            element: "kml".to_string(),
            constraint: "missing <kml> root element".to_string(),
        });
    }
    Ok(())
}

fn walk_gpx(
    xml: &str,
    schema: &'static str,
    table: &'static [ElementRule],
    version: GpxVersion,
) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Stack of open element local names; extension subtrees are opaque.
    let mut stack: Vec<String> = Vec::new();
    let mut extension_depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_schema_err(schema, e))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = local_name(e);

                if extension_depth > 0 || name == "extensions" {
                    // Opaque bag: contents validated separately if requested.
                    if !is_empty {
                        extension_depth += 1;
                        stack.push(name);
                    }
                    continue;
                }

                check_element(schema, table, &stack, &name, e, version)?;
                if !is_empty {
                    stack.push(name);
                }
            }
            Event::End(_) => {
                if extension_depth > 0 {
                    extension_depth -= 1;
                }
                stack.pop();
            }
            Event::Text(t) => {
                if extension_depth > 0 {
                    continue;
                }
                let Some(parent) = stack.last() else {
                    continue;
                };
                let text = t.xml_content().map_err(|e| xml_schema_err(schema, e))?;
                let text = text.trim();
                if DECIMAL_CONTENT.contains(&parent.as_str()) && text.parse::<f64>().is_err() {
                    return Err(TrackError::Schema {
                        schema,
                        element: parent.clone(),
                        constraint: format!("content '{text}' is not a decimal number"),
                    });
                }
                if parent == "time" && parse_timestamp(text).is_none() {
                    return Err(TrackError::Schema {
                        schema,
                        element: parent.clone(),
                        constraint: format!("content '{text}' is not a valid timestamp"),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(())
}

fn check_element(
    schema: &'static str,
    table: &'static [ElementRule],
    stack: &[String],
    name: &str,
    element: &BytesStart<'_>,
    version: GpxVersion,
) -> Result<()> {
    // Containment: the parent's rule must list this child.
    if let Some(parent) = stack.last() {
        match rule_for(table, parent) {
            Some(rule) if rule.children.contains(&name) => {}
            Some(_) => {
                return Err(TrackError::Schema {
                    schema,
                    element: format!("{parent}/{name}"),
                    constraint: format!("element not allowed inside <{parent}>"),
                });
            }
            // Parent is a leaf (text-only) element.
            None => {
                return Err(TrackError::Schema {
                    schema,
                    element: format!("{parent}/{name}"),
                    constraint: format!("<{parent}> does not allow child elements"),
                });
            }
        }
    } else if name != "gpx" {
        return Err(TrackError::Schema {
            schema,
            element: name.to_string(),
            constraint: "document root must be <gpx>".to_string(),
        });
    }

    let Some(rule) = rule_for(table, name) else {
        return Ok(());
    };

    for required in rule.required_attributes {
        let value = attribute_value(element, required.as_bytes());
        let Some(value) = value else {
            return Err(TrackError::Schema {
                schema,
                element: format!("{name}@{required}"),
                constraint: "required attribute missing".to_string(),
            });
        };

        match *required {
            "version" => {
                if GpxVersion::parse(&value) != Some(version) {
                    return Err(TrackError::Schema {
                        schema,
                        element: format!("{name}@version"),
                        constraint: format!("version '{value}' does not match the schema"),
                    });
                }
            }
            "lat" | "minlat" | "maxlat" => {
                if !value
                    .trim()
                    .parse::<f64>()
                    .is_ok_and(|v| (-90.0..=90.0).contains(&v))
                {
                    return Err(TrackError::Schema {
                        schema,
                        element: format!("{name}@{required}"),
                        constraint: format!("'{value}' is not a latitude in -90..90"),
                    });
                }
            }
            "lon" | "minlon" | "maxlon" => {
                if !value
                    .trim()
                    .parse::<f64>()
                    .is_ok_and(|v| (-180.0..=180.0).contains(&v))
                {
                    return Err(TrackError::Schema {
                        schema,
                        element: format!("{name}@{required}"),
                        constraint: format!("'{value}' is not a longitude in -180..180"),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn rule_for(table: &'static [ElementRule], name: &str) -> Option<&'static ElementRule> {
    table.iter().find(|rule| rule.name == name)
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn attribute_value(element: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    element.attributes().flatten().find_map(|attr| {
        (attr.key.local_name().as_ref() == name)
            .then(|| attr.unescape_value().ok().map(|v| v.into_owned()))
            .flatten()
    })
}

fn xml_schema_err(schema: &'static str, e: impl std::fmt::Display) -> TrackError {
    TrackError::Schema {
        schema,
        element: "(document)".to_string(),
        constraint: format!("malformed XML: {e}"),
    }
}

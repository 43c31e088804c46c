//! Geometry helpers shared by staging and resolution.
//!
//! Edge geometries travel through the store as `LINESTRING` well-known text;
//! the helpers here render, parse, and measure that text. Lengths use the
//! spherical haversine formula, which is accurate to well under a percent at
//! road-segment scale.

use geo::Coord;
use thiserror::Error;

use crate::way::WayNode;

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Render the nodes of a segment as `LINESTRING` well-known text.
///
/// The rendering is canonical: the same coordinates always produce the same
/// text, which is what the duplicate filter compares.
///
/// # Examples
/// ```
/// use waygraph_core::geometry::linestring_wkt;
/// use waygraph_core::WayNode;
///
/// let nodes = [WayNode::new(1, 0.0, 0.0), WayNode::new(2, 1.0, 1.5)];
/// assert_eq!(linestring_wkt(nodes.iter()), "LINESTRING(0 0,1 1.5)");
/// ```
pub fn linestring_wkt<'a>(nodes: impl Iterator<Item = &'a WayNode>) -> String {
    let mut text = String::from("LINESTRING(");
    for (index, node) in nodes.enumerate() {
        if index > 0 {
            text.push(',');
        }
        text.push_str(&format!("{} {}", node.lon(), node.lat()));
    }
    text.push(')');
    text
}

/// Errors returned by [`parse_linestring_wkt`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WktError {
    /// The text is not of the form `LINESTRING(...)`.
    #[error("geometry text is not a LINESTRING")]
    NotALinestring,
    /// A coordinate token could not be parsed as `lon lat`.
    #[error("invalid coordinate {token:?} in LINESTRING")]
    InvalidCoordinate {
        /// The token that failed to parse.
        token: String,
    },
}

/// Parse `LINESTRING` well-known text back into coordinates.
pub fn parse_linestring_wkt(text: &str) -> Result<Vec<Coord<f64>>, WktError> {
    let body = text
        .strip_prefix("LINESTRING(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or(WktError::NotALinestring)?;
    body.split(',')
        .map(|token| {
            let mut parts = token.split_whitespace();
            let lon = parts.next().and_then(|part| part.parse::<f64>().ok());
            let lat = parts.next().and_then(|part| part.parse::<f64>().ok());
            match (lon, lat, parts.next()) {
                (Some(x), Some(y), None) => Ok(Coord { x, y }),
                _ => Err(WktError::InvalidCoordinate {
                    token: token.to_owned(),
                }),
            }
        })
        .collect()
}

/// Great-circle distance between two lon/lat positions in metres.
pub fn haversine_distance_m(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let from_lat = from.y.to_radians();
    let to_lat = to.y.to_radians();
    let delta_lat = (to.y - from.y).to_radians();
    let delta_lon = (to.x - from.x).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + from_lat.cos() * to_lat.cos() * (delta_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Length of a coordinate run in metres.
pub fn linestring_length_m(coords: &[Coord<f64>]) -> f64 {
    coords
        .windows(2)
        .map(|pair| haversine_distance_m(pair[0], pair[1]))
        .sum()
}

/// Axis-aligned bounding box of a geometry, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Western bound.
    pub min_lon: f64,
    /// Southern bound.
    pub min_lat: f64,
    /// Eastern bound.
    pub max_lon: f64,
    /// Northern bound.
    pub max_lat: f64,
}

impl BoundingBox {
    /// Bounding box of a run of nodes; `None` when the run is empty.
    pub fn of<'a>(nodes: impl Iterator<Item = &'a WayNode>) -> Option<Self> {
        let mut bbox: Option<Self> = None;
        for node in nodes {
            let (lon, lat) = (node.lon(), node.lat());
            bbox = Some(match bbox {
                None => Self {
                    min_lon: lon,
                    min_lat: lat,
                    max_lon: lon,
                    max_lat: lat,
                },
                Some(current) => Self {
                    min_lon: current.min_lon.min(lon),
                    min_lat: current.min_lat.min(lat),
                    max_lon: current.max_lon.max(lon),
                    max_lat: current.max_lat.max(lat),
                },
            });
        }
        bbox
    }
}

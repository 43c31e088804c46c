//! Input road-way model consumed by the ingestion pipeline.
//!
//! A [`Way`] is the unit handed over by the upstream parser: an ordered run
//! of geometry nodes plus the tag metadata and speed/direction attributes the
//! pipeline turns into edge rows. Construction validates the numeric
//! attributes early so downstream components can rely on them.

use geo::Coord;
use thiserror::Error;

/// The tag key/value pair that classifies a way.
///
/// An incomplete pair (empty key or value) marks a way the pipeline skips
/// silently; it is data to be filtered, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagConfig {
    /// Tag key, e.g. `highway`.
    pub key: String,
    /// Tag value, e.g. `residential`.
    pub value: String,
}

impl TagConfig {
    /// Construct a tag pair from anything string-like.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether both key and value are present.
    ///
    /// # Examples
    /// ```
    /// use waygraph_core::TagConfig;
    ///
    /// assert!(TagConfig::new("highway", "residential").is_complete());
    /// assert!(!TagConfig::new("highway", "").is_complete());
    /// ```
    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }
}

/// Traversal directionality of a way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OneWay {
    /// Directionality could not be determined from the source tags.
    #[default]
    Unknown,
    /// Traversable only in node order.
    Yes,
    /// Traversable in both directions.
    No,
    /// Traversable only against node order.
    Reversed,
}

impl OneWay {
    /// Whether the way may only be traversed in node order.
    pub fn is_oneway(self) -> bool {
        self == Self::Yes
    }

    /// Whether the way may only be traversed against node order.
    pub fn is_reversed(self) -> bool {
        self == Self::Reversed
    }

    /// Integer encoding persisted in the edge table.
    ///
    /// `1` = one-way, `2` = both directions, `-1` = reversed, `0` = unknown.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Yes => 1,
            Self::No => 2,
            Self::Reversed => -1,
        }
    }
}

/// A single geometry node of a way.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WayNode {
    /// External identifier of the node; shared nodes join ways together.
    pub osm_id: i64,
    /// Node position, `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
}

impl WayNode {
    /// Construct a node from its external id and lon/lat position.
    pub fn new(osm_id: i64, lon: f64, lat: f64) -> Self {
        Self {
            osm_id,
            location: Coord { x: lon, y: lat },
        }
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.location.x
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.location.y
    }
}

/// Errors returned by [`Way::new`] and [`Way::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum WayError {
    /// A speed attribute was zero, negative, or not finite.
    #[error("way {osm_id}: {direction} speed {value} km/h is not a positive finite number")]
    InvalidSpeed {
        /// Way the speed belongs to.
        osm_id: i64,
        /// `forward` or `backward`.
        direction: &'static str,
        /// Offending value.
        value: f64,
    },
    /// The way has fewer than two geometry nodes.
    #[error("way {osm_id} has {count} nodes; at least two are required")]
    TooFewNodes {
        /// Way the geometry belongs to.
        osm_id: i64,
        /// Number of nodes supplied.
        count: usize,
    },
    /// A node coordinate was not finite.
    #[error("way {osm_id}: node {node_osm_id} has a non-finite coordinate")]
    InvalidCoordinate {
        /// Way the geometry belongs to.
        osm_id: i64,
        /// Node carrying the bad coordinate.
        node_osm_id: i64,
    },
}

/// An input road way prior to splitting.
///
/// # Examples
/// ```
/// use waygraph_core::{OneWay, TagConfig, Way, WayNode};
///
/// # fn main() -> Result<(), waygraph_core::WayError> {
/// let way = Way::new(
///     10,
///     Some("High Street".into()),
///     TagConfig::new("highway", "residential"),
///     50.0,
///     45.0,
///     OneWay::Yes,
///     vec![WayNode::new(1, 0.0, 0.0), WayNode::new(2, 1.0, 1.0)],
/// )?;
/// assert!(way.one_way.is_oneway());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Way {
    /// External identifier of the way.
    pub osm_id: i64,
    /// Optional road name.
    pub name: Option<String>,
    /// Classifying tag pair.
    pub tag: TagConfig,
    /// Maximum speed in node order, km/h.
    pub maxspeed_forward_kmh: f64,
    /// Maximum speed against node order, km/h.
    pub maxspeed_backward_kmh: f64,
    /// Directionality of the way.
    pub one_way: OneWay,
    /// Ordered geometry nodes.
    pub nodes: Vec<WayNode>,
}

impl Way {
    /// Validate and construct a [`Way`].
    #[expect(clippy::too_many_arguments, reason = "mirrors the input record")]
    pub fn new(
        osm_id: i64,
        name: Option<String>,
        tag: TagConfig,
        maxspeed_forward_kmh: f64,
        maxspeed_backward_kmh: f64,
        one_way: OneWay,
        nodes: Vec<WayNode>,
    ) -> Result<Self, WayError> {
        let way = Self {
            osm_id,
            name,
            tag,
            maxspeed_forward_kmh,
            maxspeed_backward_kmh,
            one_way,
            nodes,
        };
        way.validate()?;
        Ok(way)
    }

    /// Re-check the construction invariants.
    ///
    /// Useful after deserializing a way from an external source, which
    /// bypasses [`Way::new`].
    pub fn validate(&self) -> Result<(), WayError> {
        for (direction, value) in [
            ("forward", self.maxspeed_forward_kmh),
            ("backward", self.maxspeed_backward_kmh),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(WayError::InvalidSpeed {
                    osm_id: self.osm_id,
                    direction,
                    value,
                });
            }
        }
        if self.nodes.len() < 2 {
            return Err(WayError::TooFewNodes {
                osm_id: self.osm_id,
                count: self.nodes.len(),
            });
        }
        for node in &self.nodes {
            if !node.lon().is_finite() || !node.lat().is_finite() {
                return Err(WayError::InvalidCoordinate {
                    osm_id: self.osm_id,
                    node_osm_id: node.osm_id,
                });
            }
        }
        Ok(())
    }
}

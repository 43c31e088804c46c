//! Core domain types for the waygraph ingestion pipeline.
//!
//! Responsibilities:
//! - Model the immutable inputs: ways with tag metadata and the tag→class
//!   configuration.
//! - Define the splitter contract that cuts a way into boundary-aligned
//!   segments.
//! - Provide the geometry helpers (WKT text, haversine lengths, bounding
//!   boxes) shared by staging and resolution.
//! - Describe the persisted graph rows (vertices and edges).
//!
//! Boundaries:
//! - No persistence here; the store lives in `waygraph-ingest`.
//! - No raw-source parsing; callers construct [`Way`] and [`Configuration`]
//!   values themselves.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude` throughout.

pub mod config;
pub mod geometry;
pub mod graph;
pub mod split;
pub mod way;

pub use config::{ClassEntry, Configuration, TagClass};
pub use geometry::{BoundingBox, WktError};
pub use graph::{Edge, Vertex};
pub use split::{PassthroughSplitter, SegmentError, SplitError, WaySegment, WaySplitter};
pub use way::{OneWay, TagConfig, Way, WayError, WayNode};

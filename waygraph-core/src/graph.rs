//! Persisted graph row models.
//!
//! These mirror the relational schema the pipeline writes: a vertex per
//! distinct endpoint node and an edge per staged segment. Both are immutable
//! once committed; the read-back queries in the ingestion crate materialize
//! them for consumers and tests.

use geo::Coord;

/// A graph node persisted in the vertex table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Surrogate identifier assigned on creation, never reused.
    pub id: i64,
    /// External node identifier; unique across the table.
    pub osm_id: i64,
    /// Node position, `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
}

/// A directed graph arc persisted in the edge table.
///
/// `cost_s` applies in node order using the forward speed, `reverse_cost_s`
/// against node order using the backward speed; a negative value marks the
/// direction as not traversable.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Surrogate identifier.
    pub id: i64,
    /// External identifier of the way the segment came from.
    pub osm_id: i64,
    /// Routing class resolved from the way's tag pair.
    pub class_id: i64,
    /// Optional road name.
    pub name: Option<String>,
    /// Surrogate id of the source vertex.
    pub source: i64,
    /// Surrogate id of the target vertex.
    pub target: i64,
    /// External id of the source endpoint node.
    pub source_osm: i64,
    /// External id of the target endpoint node.
    pub target_osm: i64,
    /// Segment length in metres; set exactly once.
    pub length_m: f64,
    /// Traversal cost in seconds, in node order.
    pub cost_s: f64,
    /// Traversal cost in seconds, against node order.
    pub reverse_cost_s: f64,
    /// Segment geometry as `LINESTRING` well-known text.
    pub geometry: String,
}

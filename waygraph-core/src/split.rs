//! The way-splitting contract.
//!
//! Splitting a way into boundary-aligned segments is owned by an upstream
//! collaborator; the pipeline only consumes its output. The [`WaySplitter`]
//! trait is that seam. [`PassthroughSplitter`] serves inputs whose ways were
//! already cut upstream, treating each way as a single segment.

use thiserror::Error;

use crate::way::{Way, WayNode};

/// Errors returned by [`WaySegment::new`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    /// A segment needs at least two nodes to form an edge.
    #[error("segment has {count} nodes; at least two are required")]
    TooFewNodes {
        /// Number of nodes supplied.
        count: usize,
    },
}

/// A boundary-aligned sub-piece of a way.
///
/// Invariant: always holds at least two nodes, so the endpoint accessors are
/// total.
#[derive(Debug, Clone, PartialEq)]
pub struct WaySegment {
    nodes: Vec<WayNode>,
}

impl WaySegment {
    /// Validate and construct a segment from its ordered nodes.
    pub fn new(nodes: Vec<WayNode>) -> Result<Self, SegmentError> {
        if nodes.len() < 2 {
            return Err(SegmentError::TooFewNodes { count: nodes.len() });
        }
        Ok(Self { nodes })
    }

    /// Ordered nodes of the segment.
    pub fn nodes(&self) -> &[WayNode] {
        &self.nodes
    }

    /// First node; the edge's source endpoint.
    pub fn source(&self) -> &WayNode {
        &self.nodes[0]
    }

    /// Last node; the edge's target endpoint.
    pub fn target(&self) -> &WayNode {
        &self.nodes[self.nodes.len() - 1]
    }
}

/// Errors returned by a [`WaySplitter`].
#[derive(Debug, Error)]
pub enum SplitError {
    /// The splitter produced a segment that fails segment validation.
    #[error("way {osm_id} produced an invalid segment")]
    InvalidSegment {
        /// Way being split.
        osm_id: i64,
        /// Underlying segment validation failure.
        #[source]
        source: SegmentError,
    },
    /// The splitter failed for an implementation-specific reason.
    #[error("failed to split way {osm_id}: {message}")]
    Failed {
        /// Way being split.
        osm_id: i64,
        /// Splitter-specific description.
        message: String,
    },
}

/// Cut a way into its ordered, boundary-aligned segments.
///
/// Implementations must preserve node order within each segment and return
/// segments in way order; consecutive segments share their boundary node.
///
/// # Examples
/// ```
/// use waygraph_core::{SplitError, Way, WaySegment, WaySplitter};
///
/// /// Splits every way at each interior node.
/// struct PerNodeSplitter;
///
/// impl WaySplitter for PerNodeSplitter {
///     fn split(&self, way: &Way) -> Result<Vec<WaySegment>, SplitError> {
///         way.nodes
///             .windows(2)
///             .map(|pair| {
///                 WaySegment::new(pair.to_vec()).map_err(|source| {
///                     SplitError::InvalidSegment {
///                         osm_id: way.osm_id,
///                         source,
///                     }
///                 })
///             })
///             .collect()
///     }
/// }
/// ```
pub trait WaySplitter {
    /// Return the ordered segments of `way`.
    fn split(&self, way: &Way) -> Result<Vec<WaySegment>, SplitError>;
}

/// Splitter for inputs that were already cut upstream: each way becomes one
/// segment spanning all its nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSplitter;

impl WaySplitter for PassthroughSplitter {
    fn split(&self, way: &Way) -> Result<Vec<WaySegment>, SplitError> {
        let segment =
            WaySegment::new(way.nodes.clone()).map_err(|source| SplitError::InvalidSegment {
                osm_id: way.osm_id,
                source,
            })?;
        Ok(vec![segment])
    }
}

//! Chunk-scoped pipeline errors.
//!
//! The pipeline distinguishes two failure scopes by type rather than by
//! convention: a [`ChunkError`] aborts and rolls back exactly one chunk while
//! the loop continues, whereas schema-setup failures
//! ([`SetupError`](crate::schema::SetupError)) terminate the run. Constraint
//! violations and connectivity loss during ingestion both surface here and
//! are never retried.

use thiserror::Error;
use waygraph_core::SplitError;

/// Failure while building staged rows for one way.
#[derive(Debug, Error)]
pub enum RowBuildError {
    /// The way's tag pair is not present in the configuration.
    #[error("way {way_osm_id}: tag {key}={value} has no configured class")]
    UnknownTagClass {
        /// Way whose tag failed to resolve.
        way_osm_id: i64,
        /// Tag key.
        key: String,
        /// Tag value.
        value: String,
    },
    /// The splitter rejected the way.
    #[error(transparent)]
    Split(#[from] SplitError),
}

/// An error that aborts the current chunk and rolls back its unit of work.
///
/// The ingestion loop logs the failing chunk's way range and continues with
/// the next chunk; persisted state is exactly as before the chunk started.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// Beginning the chunk's transaction failed.
    #[error("failed to begin the chunk's unit of work")]
    Begin {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Building staged rows for a way failed.
    #[error(transparent)]
    BuildRows(#[from] RowBuildError),
    /// Creating the staging table failed.
    #[error("failed to create the staging table")]
    CreateStaging {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Appending a staged row failed.
    #[error("failed to stage a segment of way {way_osm_id}")]
    AppendRow {
        /// Way whose segment failed to stage.
        way_osm_id: i64,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Building the staging lookup or spatial indexes failed.
    #[error("failed to index the staging table")]
    IndexStaging {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The duplicate filter failed.
    #[error("failed to remove already-persisted duplicates from staging")]
    Deduplicate {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A resolve pass over the staged endpoints failed.
    #[error("failed to resolve staged endpoints against the vertex table")]
    Resolve {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Materializing missing vertices failed.
    #[error("failed to materialize new vertices")]
    Materialize {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Endpoint resolution stopped making progress.
    #[error("endpoint resolution stalled with {unresolved} endpoints unresolved")]
    ResolutionStalled {
        /// Endpoints still unresolved when the fixed point stalled.
        unresolved: i64,
    },
    /// The guarded length/cost computation failed.
    #[error("failed to compute segment lengths and costs")]
    ComputeCosts {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Appending resolved rows into the permanent edge table failed.
    #[error("failed to merge staged rows into the edge table")]
    Merge {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Mirroring new edges into the spatial index failed.
    #[error("failed to mirror new edges into the spatial index")]
    SpatialMirror {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Dropping the staging table failed.
    #[error("failed to drop the staging table")]
    DropStaging {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Committing the chunk failed.
    #[error("failed to commit the chunk")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

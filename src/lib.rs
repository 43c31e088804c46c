//! Facade crate for the waygraph road-network ingestion pipeline.
//!
//! This crate re-exports the core domain types and the ingestion pipeline so
//! consumers can depend on one crate.

#![forbid(unsafe_code)]

pub use waygraph_core::{
    ClassEntry, Configuration, Edge, OneWay, PassthroughSplitter, SegmentError, SplitError,
    TagClass, TagConfig, Vertex, Way, WayError, WayNode, WaySegment, WaySplitter,
};

pub use waygraph_ingest::{
    ChunkError, ChunkOutcome, ChunkRange, ChunkStats, IngestOptions, IngestReport, NullProgress,
    ProgressObserver, Session, SessionError, SetupError, TableNames, create_schema, drop_schema,
    export_configuration, run_ingestion,
};

//! Chunked ingestion of road ways into a routable graph store.
//!
//! Responsibilities:
//! - Own the store session, schema, and table-name discipline.
//! - Stage each chunk's candidate edge rows into an ephemeral table.
//! - Filter rows already persisted, resolve endpoints into vertices, and
//!   commit each chunk as one atomic unit.
//! - Report progress and per-chunk outcomes without printing.
//!
//! Boundaries:
//! - Domain types and the splitter contract live in `waygraph-core`.
//! - No raw-source parsing, no option parsing, no logger installation.
//!
//! Invariants:
//! - No global mutable state; the [`Session`] is passed explicitly.
//! - A staging table never outlives its chunk's unit of work.
#![forbid(unsafe_code)]

pub mod dedup;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod progress;
pub mod query;
pub mod report;
pub mod resolve;
pub mod rows;
pub mod schema;
pub mod session;
pub mod staging;

pub use error::{ChunkError, RowBuildError};
pub use pipeline::{IngestOptions, run_ingestion};
pub use progress::{NullProgress, ProgressObserver};
pub use query::QueryError;
pub use report::{ChunkOutcome, ChunkRange, ChunkStats, IngestReport};
pub use schema::{SetupError, create_schema, drop_schema, export_configuration};
pub use session::{Session, SessionError, TableNameError, TableNames};

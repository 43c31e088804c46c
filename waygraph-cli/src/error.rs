//! Error types emitted by the waygraph CLI.

use std::path::PathBuf;

use thiserror::Error;
use waygraph_core::WayError;
use waygraph_ingest::{SessionError, SetupError, TableNameError};

/// Errors emitted by the waygraph CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// An input file could not be read.
    #[error("failed to read {path:?}: {source}")]
    ReadInput {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An input file was not valid JSON of the expected shape.
    #[error("failed to parse {path:?}: {source}")]
    ParseInput {
        /// Path of the malformed file.
        path: PathBuf,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A deserialized way failed validation.
    #[error("ways file entry {index} is invalid: {source}")]
    InvalidWay {
        /// Zero-based index of the offending entry.
        index: usize,
        /// Validation failure.
        #[source]
        source: WayError,
    },
    /// The requested chunk size was zero.
    #[error("--chunk-size must be at least 1")]
    ZeroChunkSize,
    /// Opening or configuring the store session failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The configured table prefix or suffix is invalid.
    #[error(transparent)]
    TableNames(#[from] TableNameError),
    /// Schema setup or the configuration export failed.
    #[error(transparent)]
    Setup(#[from] SetupError),
}

//! The `ingest` subcommand: wire JSON inputs into the pipeline.
//!
//! The ways file is a JSON array of way records and the config file a JSON
//! array of tag→class entries; both are produced by an upstream exporter.
//! Deserialized ways are re-validated before ingestion starts so malformed
//! input fails the run up front rather than a chunk at a time.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::Parser;
use waygraph_core::{ClassEntry, Configuration, PassthroughSplitter, Way};
use waygraph_ingest::{
    ChunkError, ChunkRange, ChunkStats, IngestOptions, ProgressObserver, Session, TableNames,
    create_schema, drop_schema, export_configuration, run_ingestion,
};

use crate::error::CliError;

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(about = "Ingest way records into the routable graph store")]
pub struct IngestArgs {
    /// SQLite database to ingest into; created if missing.
    #[arg(long, value_name = "PATH")]
    pub db: PathBuf,

    /// JSON file holding the array of way records.
    #[arg(long, value_name = "PATH")]
    pub ways: PathBuf,

    /// JSON file holding the tag→class configuration entries.
    #[arg(long, value_name = "PATH")]
    pub config: PathBuf,

    /// Ways staged per chunk.
    #[arg(long, value_name = "N", default_value_t = 20_000)]
    pub chunk_size: usize,

    /// Prefix applied to every graph table name.
    #[arg(long, value_name = "NAME", default_value = "")]
    pub prefix: String,

    /// Suffix applied to every graph table name.
    #[arg(long, value_name = "NAME", default_value = "")]
    pub suffix: String,

    /// Drop existing graph tables before ingesting.
    #[arg(long)]
    pub clean: bool,
}

/// Final counters reported after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Ways read from the input file.
    pub ways_read: usize,
    /// Edges added across committed chunks.
    pub edges_added: usize,
    /// Vertices added across committed chunks.
    pub vertices_added: usize,
    /// Ways skipped for incomplete tags.
    pub ways_skipped: usize,
    /// Staged rows dropped as already persisted.
    pub duplicates_removed: usize,
    /// Chunks rolled back.
    pub failed_chunks: usize,
}

/// Execute the `ingest` subcommand.
pub fn run_ingest(
    args: &IngestArgs,
    progress: &mut dyn ProgressObserver,
) -> Result<IngestSummary, CliError> {
    let chunk_size = NonZeroUsize::new(args.chunk_size).ok_or(CliError::ZeroChunkSize)?;
    let tables = TableNames::new(&args.prefix, &args.suffix)?;

    let configuration = load_configuration(&args.config)?;
    let ways = load_ways(&args.ways)?;

    let mut session = Session::open(&args.db)?;
    if args.clean {
        drop_schema(&session, &tables)?;
    }
    create_schema(&session, &tables)?;
    export_configuration(&mut session, &tables, &configuration)?;

    let options = IngestOptions {
        chunk_size,
        tables,
    };
    let report = run_ingestion(
        &mut session,
        &ways,
        &configuration,
        &PassthroughSplitter,
        &options,
        progress,
    );

    Ok(IngestSummary {
        ways_read: ways.len(),
        edges_added: report.edges_added(),
        vertices_added: report.vertices_added(),
        ways_skipped: report.ways_skipped(),
        duplicates_removed: report.duplicates_removed(),
        failed_chunks: report.failed_chunks().count(),
    })
}

fn load_ways(path: &Path) -> Result<Vec<Way>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    let ways: Vec<Way> = serde_json::from_str(&text).map_err(|source| CliError::ParseInput {
        path: path.to_path_buf(),
        source,
    })?;
    for (index, way) in ways.iter().enumerate() {
        way.validate()
            .map_err(|source| CliError::InvalidWay { index, source })?;
    }
    Ok(ways)
}

fn load_configuration(path: &Path) -> Result<Configuration, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<ClassEntry> =
        serde_json::from_str(&text).map_err(|source| CliError::ParseInput {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Configuration::from_entries(entries))
}

/// Progress observer that prints counters to stdout and failures to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn chunk_committed(&mut self, range: ChunkRange, stats: &ChunkStats) {
        println!(
            "  {range}: {} edges added, {} duplicates dropped, {} vertices new",
            stats.edges_added, stats.duplicates_removed, stats.vertices_added
        );
    }

    fn chunk_failed(&mut self, range: ChunkRange, error: &ChunkError) {
        eprintln!("  {range}: rolled back: {error}");
    }

    fn ways_processed(&mut self, processed: usize, total: usize) {
        println!("Processed {processed}/{total} ways");
    }
}

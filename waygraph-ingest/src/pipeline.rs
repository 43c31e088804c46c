//! The chunked ingestion loop.
//!
//! The orchestrator partitions the way collection into fixed-size chunks and
//! runs each through staging, deduplication, resolution, and the merge commit
//! inside one unit of work. The chunk is the sole failure-isolation boundary:
//! an error rolls back that chunk only, is logged with the failing way range,
//! and the loop continues. There are no retries.

use std::num::NonZeroUsize;

use log::error;
use waygraph_core::{Configuration, Way, WaySplitter};

use crate::error::ChunkError;
use crate::progress::ProgressObserver;
use crate::report::{ChunkOutcome, ChunkRange, ChunkStats, IngestReport};
use crate::session::{Session, TableNames};
use crate::{dedup, merge, resolve, rows, staging};

/// Tunables for one ingestion run, owned by the caller's configuration.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Ways staged per chunk; the last chunk may be shorter.
    pub chunk_size: NonZeroUsize,
    /// Table names the run writes to.
    pub tables: TableNames,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: NonZeroUsize::new(20_000).unwrap_or(NonZeroUsize::MIN),
            tables: TableNames::default(),
        }
    }
}

/// Run the chunked ingestion of `ways` into the graph tables.
///
/// The schema must exist (see [`create_schema`](crate::schema::create_schema));
/// failures per chunk are absorbed into the report rather than returned.
pub fn run_ingestion(
    session: &mut Session,
    ways: &[Way],
    configuration: &Configuration,
    splitter: &dyn WaySplitter,
    options: &IngestOptions,
    progress: &mut dyn ProgressObserver,
) -> IngestReport {
    let total = ways.len();
    let chunk_size = options.chunk_size.get();
    let mut report = IngestReport::default();
    let mut processed = 0;

    for (index, chunk) in ways.chunks(chunk_size).enumerate() {
        let range = ChunkRange {
            start: index * chunk_size,
            end: index * chunk_size + chunk.len(),
        };
        progress.chunk_started(range);

        let outcome = ingest_chunk(session, chunk, configuration, splitter, &options.tables);
        processed += chunk.len();
        progress.ways_processed(processed, total);

        match outcome {
            Ok(stats) => {
                progress.chunk_committed(range, &stats);
                report.chunks.push(ChunkOutcome::Committed { range, stats });
            }
            Err(chunk_error) => {
                error!("chunk {range} rolled back: {chunk_error}");
                progress.chunk_failed(range, &chunk_error);
                report.chunks.push(ChunkOutcome::Failed {
                    range,
                    error: chunk_error,
                });
            }
        }
    }
    report
}

/// Run one chunk inside its own unit of work.
fn ingest_chunk(
    session: &mut Session,
    chunk: &[Way],
    configuration: &Configuration,
    splitter: &dyn WaySplitter,
    tables: &TableNames,
) -> Result<ChunkStats, ChunkError> {
    let tx = session
        .unit_of_work()
        .map_err(|source| ChunkError::Begin { source })?;

    let mut writer = staging::begin(&tx, tables)?;
    let mut ways_skipped = 0;
    for way in chunk {
        if !way.tag.is_complete() {
            ways_skipped += 1;
            continue;
        }
        for row in rows::build_way_rows(way, configuration, splitter)? {
            writer.append(&row)?;
        }
    }
    let staged = writer.finish(&tx)?;

    let duplicates_removed = dedup::remove_duplicates(&tx, tables)?;
    let resolution = resolve::resolve_topology(&tx, tables)?;
    resolve::compute_costs(&tx, tables)?;
    let edges_added = merge::merge_and_commit(tx, tables)?;

    Ok(ChunkStats {
        ways_skipped,
        segments_staged: staged.rows,
        duplicates_removed,
        vertices_added: resolution.vertices_added,
        edges_added,
    })
}

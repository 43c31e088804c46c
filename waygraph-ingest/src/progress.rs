//! Progress observation for the ingestion loop.
//!
//! The pipeline reports through this seam instead of printing; the CLI owns
//! the terminal. All methods default to no-ops so observers implement only
//! what they care about.

use crate::error::ChunkError;
use crate::report::{ChunkRange, ChunkStats};

/// Receives ingestion progress events.
///
/// # Examples
/// ```
/// use waygraph_ingest::{ChunkRange, ChunkStats, ProgressObserver};
///
/// /// Counts committed chunks.
/// #[derive(Default)]
/// struct ChunkCounter {
///     committed: usize,
/// }
///
/// impl ProgressObserver for ChunkCounter {
///     fn chunk_committed(&mut self, _range: ChunkRange, _stats: &ChunkStats) {
///         self.committed += 1;
///     }
/// }
/// ```
pub trait ProgressObserver {
    /// A chunk's unit of work opened.
    fn chunk_started(&mut self, range: ChunkRange) {
        let _ = range;
    }

    /// A chunk committed with the given counters.
    fn chunk_committed(&mut self, range: ChunkRange, stats: &ChunkStats) {
        let _ = (range, stats);
    }

    /// A chunk rolled back; the pipeline continues with the next one.
    fn chunk_failed(&mut self, range: ChunkRange, error: &ChunkError) {
        let _ = (range, error);
    }

    /// Running way counter, updated after every chunk.
    fn ways_processed(&mut self, processed: usize, total: usize) {
        let _ = (processed, total);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {}

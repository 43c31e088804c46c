//! Per-chunk and per-run ingestion reports.

use crate::error::ChunkError;

/// Half-open range of way indexes covered by one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Index of the first way in the chunk.
    pub start: usize,
    /// One past the index of the last way in the chunk.
    pub end: usize,
}

impl std::fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ways {}..{}", self.start, self.end)
    }
}

/// Counters for one committed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkStats {
    /// Ways skipped for an incomplete tag pair.
    pub ways_skipped: usize,
    /// Segment rows staged before filtering.
    pub segments_staged: usize,
    /// Staged rows removed as already-persisted duplicates.
    pub duplicates_removed: usize,
    /// Vertices materialized during resolution.
    pub vertices_added: usize,
    /// Edges appended by the merge.
    pub edges_added: usize,
}

/// Outcome of one chunk.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// The chunk committed; its counters are final.
    Committed {
        /// Way range the chunk covered.
        range: ChunkRange,
        /// Counters for the chunk.
        stats: ChunkStats,
    },
    /// The chunk was rolled back and contributed nothing.
    Failed {
        /// Way range the chunk covered.
        range: ChunkRange,
        /// The error that aborted the chunk.
        error: ChunkError,
    },
}

/// Summary of a whole ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Per-chunk outcomes in chunk order.
    pub chunks: Vec<ChunkOutcome>,
}

impl IngestReport {
    /// Total edges added across committed chunks.
    pub fn edges_added(&self) -> usize {
        self.committed().map(|stats| stats.edges_added).sum()
    }

    /// Total vertices added across committed chunks.
    pub fn vertices_added(&self) -> usize {
        self.committed().map(|stats| stats.vertices_added).sum()
    }

    /// Total ways skipped for incomplete tags across committed chunks.
    pub fn ways_skipped(&self) -> usize {
        self.committed().map(|stats| stats.ways_skipped).sum()
    }

    /// Total staged rows dropped as duplicates across committed chunks.
    pub fn duplicates_removed(&self) -> usize {
        self.committed().map(|stats| stats.duplicates_removed).sum()
    }

    /// Chunks that were rolled back.
    pub fn failed_chunks(&self) -> impl Iterator<Item = (&ChunkRange, &ChunkError)> {
        self.chunks.iter().filter_map(|outcome| match outcome {
            ChunkOutcome::Failed { range, error } => Some((range, error)),
            ChunkOutcome::Committed { .. } => None,
        })
    }

    /// Whether every chunk committed.
    pub fn is_complete(&self) -> bool {
        self.failed_chunks().next().is_none()
    }

    fn committed(&self) -> impl Iterator<Item = &ChunkStats> {
        self.chunks.iter().filter_map(|outcome| match outcome {
            ChunkOutcome::Committed { stats, .. } => Some(stats),
            ChunkOutcome::Failed { .. } => None,
        })
    }
}

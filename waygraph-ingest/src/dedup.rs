//! Removal of staged rows already persisted as edges.
//!
//! The match is exact and orientation-insensitive: a staged row is dropped
//! when its geometry text equals a persisted edge's geometry either in node
//! order or fully reversed. Candidates are paired through the staging and
//! edge R*Trees by bounding-box overlap before the exact comparison, so the
//! filter never scans the whole edge table per staged row. This guards
//! against re-ingesting a way already split and stored by a previous run or
//! an earlier chunk.

use rusqlite::Transaction;

use crate::error::ChunkError;
use crate::session::TableNames;

/// Delete staged rows whose geometry is already persisted.
///
/// Returns the number of rows removed from staging.
pub fn remove_duplicates(tx: &Transaction<'_>, names: &TableNames) -> Result<usize, ChunkError> {
    let staging = names.staging();
    let staging_bbox = names.staging_bbox();
    let edges = names.edges();
    let edges_bbox = names.edges_bbox();
    // The R*Tree stores single-precision bounds rounded outwards, so the
    // overlap test can produce false positives but never false negatives;
    // the geometry text comparison is the exact filter.
    let sql = format!(
        "DELETE FROM {staging} WHERE seq IN (
             SELECT sb.id
             FROM {staging_bbox} sb
             JOIN {staging} s ON s.seq = sb.id
             JOIN {edges_bbox} eb
               ON eb.min_lon <= sb.max_lon AND eb.max_lon >= sb.min_lon
              AND eb.min_lat <= sb.max_lat AND eb.max_lat >= sb.min_lat
             JOIN {edges} e ON e.id = eb.id
             WHERE e.geometry = s.geometry OR e.geometry = s.geometry_reversed
         )"
    );
    tx.execute(&sql, [])
        .map_err(|source| ChunkError::Deduplicate { source })
}

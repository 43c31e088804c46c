//! Final append of resolved rows and the chunk commit.
//!
//! The merge is one set-based insert from staging into the permanent edge
//! table, followed by mirroring the new rows into the edge R*Tree, dropping
//! the staging tables, and committing the chunk's unit of work. Consuming the
//! transaction here means a failure anywhere in the chunk rolls back the
//! whole unit: no partial staging or resolution state survives.

use rusqlite::{Transaction, params};

use crate::error::ChunkError;
use crate::session::TableNames;

/// Append the resolved staging rows, drop staging, and commit the chunk.
///
/// Returns the number of edges added.
pub fn merge_and_commit(tx: Transaction<'_>, names: &TableNames) -> Result<usize, ChunkError> {
    let staging = names.staging();
    let staging_bbox = names.staging_bbox();
    let edges = names.edges();
    let edges_bbox = names.edges_bbox();

    let watermark: i64 = tx
        .query_row(&format!("SELECT COALESCE(MAX(id), 0) FROM {edges}"), [], |row| {
            row.get(0)
        })
        .map_err(|source| ChunkError::Merge { source })?;

    let insert = format!(
        "INSERT INTO {edges} (
             osm_id, class_id, name, source, target, source_osm, target_osm,
             one_way, maxspeed_forward, maxspeed_backward, priority,
             length_m, cost_s, reverse_cost_s, geometry,
             min_lon, min_lat, max_lon, max_lat
         )
         SELECT osm_id, class_id, name, source, target, source_osm, target_osm,
                one_way, maxspeed_forward, maxspeed_backward, priority,
                length_m, cost_s, reverse_cost_s, geometry,
                min_lon, min_lat, max_lon, max_lat
         FROM {staging}
         ORDER BY seq"
    );
    let inserted = tx
        .execute(&insert, [])
        .map_err(|source| ChunkError::Merge { source })?;

    let mirror = format!(
        "INSERT INTO {edges_bbox} (id, min_lon, max_lon, min_lat, max_lat)
         SELECT id, min_lon, max_lon, min_lat, max_lat FROM {edges} WHERE id > ?1"
    );
    tx.execute(&mirror, params![watermark])
        .map_err(|source| ChunkError::SpatialMirror { source })?;

    tx.execute_batch(&format!(
        "DROP TABLE {staging}; DROP TABLE {staging_bbox};"
    ))
    .map_err(|source| ChunkError::DropStaging { source })?;

    tx.commit().map_err(|source| ChunkError::Commit { source })?;
    Ok(inserted)
}

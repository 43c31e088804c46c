//! Endpoint resolution and the immutable length/cost computation.
//!
//! Resolution is an iterative fixed point over the staged rows: a resolve
//! pass writes the surrogate id of every vertex whose external id matches a
//! staged endpoint, a materialize step inserts a vertex for every distinct
//! external id still missing, and the loop repeats until no endpoint remains
//! unresolved. One materialization round normally suffices, but the loop does
//! not assume it: it keeps iterating while progress is made and aborts the
//! chunk if an iteration leaves the unresolved count unchanged.
//!
//! Known limitation: when staged rows disagree on the coordinates of a shared
//! external id, one staged coordinate wins and the inconsistency is neither
//! detected nor reported.

use rusqlite::Transaction;

use crate::error::ChunkError;
use crate::session::TableNames;

/// Counters describing one chunk's resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolutionOutcome {
    /// Vertices materialized for endpoints that had no match.
    pub vertices_added: usize,
    /// Materialization rounds the fixed point needed.
    pub rounds: usize,
}

/// Resolve every staged endpoint to a vertex surrogate id.
pub fn resolve_topology(
    tx: &Transaction<'_>,
    names: &TableNames,
) -> Result<ResolutionOutcome, ChunkError> {
    resolve_pass(tx, names)?;

    let mut outcome = ResolutionOutcome::default();
    let mut unresolved = count_unresolved(tx, names)?;
    while unresolved > 0 {
        outcome.vertices_added += materialize_missing(tx, names)?;
        resolve_pass(tx, names)?;
        outcome.rounds += 1;

        let remaining = count_unresolved(tx, names)?;
        if remaining >= unresolved {
            return Err(ChunkError::ResolutionStalled {
                unresolved: remaining,
            });
        }
        unresolved = remaining;
    }
    Ok(outcome)
}

/// Write matching vertex surrogate ids into the null endpoint columns.
fn resolve_pass(tx: &Transaction<'_>, names: &TableNames) -> Result<(), ChunkError> {
    let staging = names.staging();
    let vertices = names.vertices();
    for (column, osm_column) in [("source", "source_osm"), ("target", "target_osm")] {
        let sql = format!(
            "UPDATE {staging}
             SET {column} = (SELECT v.id FROM {vertices} v
                             WHERE v.osm_id = {staging}.{osm_column})
             WHERE {column} IS NULL"
        );
        tx.execute(&sql, [])
            .map_err(|source| ChunkError::Resolve { source })?;
    }
    Ok(())
}

/// Insert a vertex for every distinct external id still missing a match.
fn materialize_missing(tx: &Transaction<'_>, names: &TableNames) -> Result<usize, ChunkError> {
    let staging = names.staging();
    let vertices = names.vertices();
    let mut inserted = 0;
    for (column, osm_column, lon_column, lat_column) in [
        ("source", "source_osm", "source_lon", "source_lat"),
        ("target", "target_osm", "target_lon", "target_lat"),
    ] {
        let sql = format!(
            "INSERT INTO {vertices} (osm_id, lon, lat, geometry)
             SELECT s.{osm_column}, s.{lon_column}, s.{lat_column},
                    'POINT(' || s.{lon_column} || ' ' || s.{lat_column} || ')'
             FROM {staging} s
             WHERE s.{column} IS NULL
               AND NOT EXISTS (SELECT 1 FROM {vertices} v
                               WHERE v.osm_id = s.{osm_column})
             GROUP BY s.{osm_column}"
        );
        inserted += tx
            .execute(&sql, [])
            .map_err(|source| ChunkError::Materialize { source })?;
    }
    Ok(inserted)
}

fn count_unresolved(tx: &Transaction<'_>, names: &TableNames) -> Result<i64, ChunkError> {
    let staging = names.staging();
    let sql = format!("SELECT COUNT(*) FROM {staging} WHERE source IS NULL OR target IS NULL");
    tx.query_row(&sql, [], |row| row.get(0))
        .map_err(|source| ChunkError::Resolve { source })
}

/// Fill length and directional costs for rows that do not have them yet.
///
/// The `length_m IS NULL` guard makes the computation idempotent: rows whose
/// fields are already set are never recomputed. `cost_s` uses the forward
/// speed and is negated for reversed ways; `reverse_cost_s` uses the backward
/// speed and is negated for one-way ways. A negative cost marks the direction
/// as not traversable for the routing consumer.
///
/// Returns the number of rows whose fields were filled.
pub fn compute_costs(tx: &Transaction<'_>, names: &TableNames) -> Result<usize, ChunkError> {
    let staging = names.staging();
    let sql = format!(
        "UPDATE {staging} SET
             length_m = linestring_length_m(geometry),
             cost_s = (CASE WHEN one_way = -1 THEN -1.0 ELSE 1.0 END)
                    * linestring_length_m(geometry) / (maxspeed_forward / 3.6),
             reverse_cost_s = (CASE WHEN one_way = 1 THEN -1.0 ELSE 1.0 END)
                            * linestring_length_m(geometry) / (maxspeed_backward / 3.6)
         WHERE length_m IS NULL"
    );
    tx.execute(&sql, [])
        .map_err(|source| ChunkError::ComputeCosts { source })
}

//! Typed read-back of the persisted graph.
//!
//! The pipeline itself never reads these rows; consumers and tests use them
//! to inspect what a run produced.

use geo::Coord;
use rusqlite::Row;
use thiserror::Error;
use waygraph_core::{Edge, Vertex};

use crate::session::{Session, TableNames};

/// Errors raised while reading the persisted graph.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Generic SQLite error while reading rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// All persisted vertices, ordered by surrogate id.
pub fn vertices(session: &Session, names: &TableNames) -> Result<Vec<Vertex>, QueryError> {
    let table = names.vertices();
    let sql = format!("SELECT id, osm_id, lon, lat FROM {table} ORDER BY id");
    let mut statement = session.connection().prepare(&sql)?;
    let rows = statement.query_map([], vertex_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// All persisted edges, ordered by surrogate id.
pub fn edges(session: &Session, names: &TableNames) -> Result<Vec<Edge>, QueryError> {
    let table = names.edges();
    let sql = format!(
        "SELECT id, osm_id, class_id, name, source, target, source_osm, target_osm,
                length_m, cost_s, reverse_cost_s, geometry
         FROM {table} ORDER BY id"
    );
    let mut statement = session.connection().prepare(&sql)?;
    let rows = statement.query_map([], edge_from_row)?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Number of persisted vertices.
pub fn vertex_count(session: &Session, names: &TableNames) -> Result<i64, QueryError> {
    count(session, names.vertices())
}

/// Number of persisted edges.
pub fn edge_count(session: &Session, names: &TableNames) -> Result<i64, QueryError> {
    count(session, names.edges())
}

fn count(session: &Session, table: &str) -> Result<i64, QueryError> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    Ok(session.connection().query_row(&sql, [], |row| row.get(0))?)
}

fn vertex_from_row(row: &Row<'_>) -> Result<Vertex, rusqlite::Error> {
    Ok(Vertex {
        id: row.get(0)?,
        osm_id: row.get(1)?,
        location: Coord {
            x: row.get(2)?,
            y: row.get(3)?,
        },
    })
}

fn edge_from_row(row: &Row<'_>) -> Result<Edge, rusqlite::Error> {
    Ok(Edge {
        id: row.get(0)?,
        osm_id: row.get(1)?,
        class_id: row.get(2)?,
        name: row.get(3)?,
        source: row.get(4)?,
        target: row.get(5)?,
        source_osm: row.get(6)?,
        target_osm: row.get(7)?,
        length_m: row.get(8)?,
        cost_s: row.get(9)?,
        reverse_cost_s: row.get(10)?,
        geometry: row.get(11)?,
    })
}

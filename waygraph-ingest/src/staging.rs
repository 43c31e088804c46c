//! Chunk-scoped staging of candidate edge rows.
//!
//! Each chunk stages its rows into an ephemeral table created inside the
//! chunk's transaction. Rows are appended through one prepared statement with
//! no per-row preparation; [`StagingWriter::finish`] is the explicit
//! end-of-data step that seals the stream, builds the two endpoint lookup
//! indexes and the temp R*Tree over the staged bounding boxes, and returns
//! the chunk-scoped handle. Because the table lives in the `temp` schema and
//! is created inside the unit of work, it cannot outlive the chunk: the
//! committer drops it on success and rollback removes it otherwise.

use rusqlite::{Statement, Transaction, params};

use crate::error::ChunkError;
use crate::rows::SegmentRow;
use crate::session::TableNames;

/// Handle to a sealed staging table, scoped to the chunk's unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingTable {
    /// Number of rows staged before sealing.
    pub rows: usize,
}

/// Append-only row stream into the chunk's staging table.
pub struct StagingWriter<'conn> {
    statement: Statement<'conn>,
    staging: String,
    staging_bbox: String,
    appended: usize,
}

impl std::fmt::Debug for StagingWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagingWriter")
            .field("appended", &self.appended)
            .finish_non_exhaustive()
    }
}

/// Create the chunk's staging table and open its row stream.
///
/// Any staging leftovers from an earlier chunk on the same connection are
/// discarded first.
pub fn begin<'conn>(
    tx: &'conn Transaction<'_>,
    names: &TableNames,
) -> Result<StagingWriter<'conn>, ChunkError> {
    let staging = names.staging();
    let staging_bbox = names.staging_bbox();
    let create = format!(
        "DROP TABLE IF EXISTS temp.{staging};
         DROP TABLE IF EXISTS temp.{staging_bbox};
         CREATE TEMPORARY TABLE {staging} (
             seq INTEGER PRIMARY KEY,
             osm_id INTEGER NOT NULL,
             class_id INTEGER NOT NULL,
             name TEXT,
             source INTEGER,
             target INTEGER,
             source_osm INTEGER NOT NULL,
             target_osm INTEGER NOT NULL,
             source_lon REAL NOT NULL,
             source_lat REAL NOT NULL,
             target_lon REAL NOT NULL,
             target_lat REAL NOT NULL,
             one_way INTEGER NOT NULL,
             maxspeed_forward REAL NOT NULL,
             maxspeed_backward REAL NOT NULL,
             priority REAL NOT NULL,
             length_m REAL,
             cost_s REAL,
             reverse_cost_s REAL,
             geometry TEXT NOT NULL,
             geometry_reversed TEXT NOT NULL,
             min_lon REAL NOT NULL,
             min_lat REAL NOT NULL,
             max_lon REAL NOT NULL,
             max_lat REAL NOT NULL
         );"
    );
    tx.execute_batch(&create)
        .map_err(|source| ChunkError::CreateStaging { source })?;

    let insert = format!(
        "INSERT INTO {staging} (
             osm_id, class_id, name, source_osm, target_osm,
             source_lon, source_lat, target_lon, target_lat,
             one_way, maxspeed_forward, maxspeed_backward, priority,
             geometry, geometry_reversed,
             min_lon, min_lat, max_lon, max_lat
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
    );
    let statement = tx
        .prepare(&insert)
        .map_err(|source| ChunkError::CreateStaging { source })?;

    Ok(StagingWriter {
        statement,
        staging: staging.to_owned(),
        staging_bbox: staging_bbox.to_owned(),
        appended: 0,
    })
}

impl StagingWriter<'_> {
    /// Append one candidate edge row to the stream.
    pub fn append(&mut self, row: &SegmentRow) -> Result<(), ChunkError> {
        self.statement
            .execute(params![
                row.way_osm_id,
                row.class_id,
                row.name,
                row.source_osm,
                row.target_osm,
                row.source_lon,
                row.source_lat,
                row.target_lon,
                row.target_lat,
                row.one_way,
                row.maxspeed_forward,
                row.maxspeed_backward,
                row.priority,
                row.geometry,
                row.geometry_reversed,
                row.bbox.min_lon,
                row.bbox.min_lat,
                row.bbox.max_lon,
                row.bbox.max_lat,
            ])
            .map_err(|source| ChunkError::AppendRow {
                way_osm_id: row.way_osm_id,
                source,
            })?;
        self.appended += 1;
        Ok(())
    }

    /// Seal the stream and build the staging indexes.
    ///
    /// After this no further rows can be appended; the resolution joins and
    /// the duplicate filter rely on the indexes existing.
    pub fn finish(self, tx: &Transaction<'_>) -> Result<StagingTable, ChunkError> {
        let Self {
            statement,
            staging,
            staging_bbox,
            appended,
        } = self;
        drop(statement);

        let seal = format!(
            "CREATE INDEX {staging}_source_osm_idx ON {staging}(source_osm);
             CREATE INDEX {staging}_target_osm_idx ON {staging}(target_osm);
             CREATE VIRTUAL TABLE temp.{staging_bbox}
                 USING rtree(id, min_lon, max_lon, min_lat, max_lat);
             INSERT INTO {staging_bbox} (id, min_lon, max_lon, min_lat, max_lat)
                 SELECT seq, min_lon, max_lon, min_lat, max_lat FROM {staging};"
        );
        tx.execute_batch(&seal)
            .map_err(|source| ChunkError::IndexStaging { source })?;

        Ok(StagingTable { rows: appended })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use rstest::{fixture, rstest};
    use waygraph_core::geometry::BoundingBox;

    #[fixture]
    fn session() -> Session {
        Session::open_in_memory().expect("open session")
    }

    fn sample_row(way_osm_id: i64) -> SegmentRow {
        SegmentRow {
            way_osm_id,
            class_id: 11,
            priority: 2.5,
            name: None,
            one_way: 2,
            maxspeed_forward: 50.0,
            maxspeed_backward: 50.0,
            source_osm: 1,
            source_lon: 0.0,
            source_lat: 0.0,
            target_osm: 2,
            target_lon: 1.0,
            target_lat: 1.0,
            geometry: "LINESTRING(0 0,1 1)".to_owned(),
            geometry_reversed: "LINESTRING(1 1,0 0)".to_owned(),
            bbox: BoundingBox {
                min_lon: 0.0,
                min_lat: 0.0,
                max_lon: 1.0,
                max_lat: 1.0,
            },
        }
    }

    #[rstest]
    fn stages_rows_and_fills_the_spatial_index(mut session: Session) {
        let names = TableNames::default();
        let tx = session.unit_of_work().expect("begin");
        let mut writer = begin(&tx, &names).expect("create staging");
        writer.append(&sample_row(10)).expect("append");
        writer.append(&sample_row(11)).expect("append");
        let table = writer.finish(&tx).expect("seal");
        assert_eq!(table.rows, 2);

        let staged: i64 = tx
            .query_row("SELECT COUNT(*) FROM edges_staging", [], |row| row.get(0))
            .expect("count staged");
        assert_eq!(staged, 2);
        let indexed: i64 = tx
            .query_row("SELECT COUNT(*) FROM edges_staging_bbox", [], |row| {
                row.get(0)
            })
            .expect("count spatial entries");
        assert_eq!(indexed, 2);
    }

    #[rstest]
    fn rollback_removes_the_staging_table(mut session: Session) {
        let names = TableNames::default();
        {
            let tx = session.unit_of_work().expect("begin");
            let mut writer = begin(&tx, &names).expect("create staging");
            writer.append(&sample_row(10)).expect("append");
            let _table = writer.finish(&tx).expect("seal");
            // Dropped without commit: the chunk rolls back.
        }
        let leftover: Result<i64, _> =
            session
                .connection()
                .query_row("SELECT COUNT(*) FROM edges_staging", [], |row| row.get(0));
        assert!(leftover.is_err(), "staging table must not outlive its chunk");
    }
}

//! Permanent schema setup and the configuration table export.
//!
//! Everything here runs before the ingestion loop and is fatal on failure:
//! a store that cannot hold its schema terminates the run, in contrast to
//! the chunk-scoped errors the loop absorbs.

use log::info;
use rusqlite::params;
use thiserror::Error;
use waygraph_core::Configuration;

use crate::session::{Session, TableNameError, TableNames};

/// Fatal errors raised during schema setup or teardown.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The configured table prefix or suffix is invalid.
    #[error(transparent)]
    TableName(#[from] TableNameError),
    /// Creating the permanent tables or indexes failed.
    #[error("failed to create the graph schema")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Dropping the permanent tables failed.
    #[error("failed to drop the graph schema")]
    DropSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Bulk-inserting the tag→class configuration failed.
    #[error("failed to export the tag configuration")]
    ExportConfiguration {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Create the vertex, edge, and configuration tables with their indexes.
///
/// Idempotent: every statement is `IF NOT EXISTS`, so re-running against an
/// existing schema is a no-op.
pub fn create_schema(session: &Session, names: &TableNames) -> Result<(), SetupError> {
    let vertices = names.vertices();
    let edges = names.edges();
    let edges_bbox = names.edges_bbox();
    let configuration = names.configuration();
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS {vertices} (
             id INTEGER PRIMARY KEY,
             osm_id INTEGER NOT NULL UNIQUE,
             lon REAL NOT NULL,
             lat REAL NOT NULL,
             geometry TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS {configuration} (
             class_id INTEGER PRIMARY KEY,
             tag_key TEXT NOT NULL,
             tag_value TEXT NOT NULL,
             priority REAL NOT NULL,
             UNIQUE (tag_key, tag_value)
         );
         CREATE TABLE IF NOT EXISTS {edges} (
             id INTEGER PRIMARY KEY,
             osm_id INTEGER NOT NULL,
             class_id INTEGER NOT NULL,
             name TEXT,
             source INTEGER NOT NULL REFERENCES {vertices}(id),
             target INTEGER NOT NULL REFERENCES {vertices}(id),
             source_osm INTEGER NOT NULL,
             target_osm INTEGER NOT NULL,
             one_way INTEGER NOT NULL,
             maxspeed_forward REAL NOT NULL,
             maxspeed_backward REAL NOT NULL,
             priority REAL NOT NULL,
             length_m REAL NOT NULL,
             cost_s REAL NOT NULL,
             reverse_cost_s REAL NOT NULL,
             geometry TEXT NOT NULL,
             min_lon REAL NOT NULL,
             min_lat REAL NOT NULL,
             max_lon REAL NOT NULL,
             max_lat REAL NOT NULL
         );
         CREATE INDEX IF NOT EXISTS {edges}_source_idx ON {edges}(source);
         CREATE INDEX IF NOT EXISTS {edges}_target_idx ON {edges}(target);
         CREATE INDEX IF NOT EXISTS {edges}_source_osm_idx ON {edges}(source_osm);
         CREATE INDEX IF NOT EXISTS {edges}_target_osm_idx ON {edges}(target_osm);
         CREATE VIRTUAL TABLE IF NOT EXISTS {edges_bbox}
             USING rtree(id, min_lon, max_lon, min_lat, max_lat);"
    );
    session
        .connection()
        .execute_batch(&ddl)
        .map_err(|source| SetupError::CreateSchema { source })?;
    info!("graph schema ready: {vertices}, {edges}, {configuration}");
    Ok(())
}

/// Drop the permanent tables, edges before the vertices they reference.
pub fn drop_schema(session: &Session, names: &TableNames) -> Result<(), SetupError> {
    let vertices = names.vertices();
    let edges = names.edges();
    let edges_bbox = names.edges_bbox();
    let configuration = names.configuration();
    let ddl = format!(
        "DROP TABLE IF EXISTS {edges_bbox};
         DROP TABLE IF EXISTS {edges};
         DROP TABLE IF EXISTS {vertices};
         DROP TABLE IF EXISTS {configuration};"
    );
    session
        .connection()
        .execute_batch(&ddl)
        .map_err(|source| SetupError::DropSchema { source })?;
    info!("graph schema dropped");
    Ok(())
}

/// Bulk-insert the tag→class configuration rows.
///
/// Returns the number of rows written. Existing rows with the same class id
/// or tag pair are replaced.
pub fn export_configuration(
    session: &mut Session,
    names: &TableNames,
    configuration: &Configuration,
) -> Result<usize, SetupError> {
    let table = names.configuration().to_owned();
    let tx = session
        .unit_of_work()
        .map_err(|source| SetupError::ExportConfiguration { source })?;
    let mut written = 0;
    {
        let sql = format!(
            "INSERT OR REPLACE INTO {table} (class_id, tag_key, tag_value, priority)
             VALUES (?1, ?2, ?3, ?4)"
        );
        let mut statement = tx
            .prepare(&sql)
            .map_err(|source| SetupError::ExportConfiguration { source })?;
        for entry in configuration.entries() {
            statement
                .execute(params![
                    entry.class.id,
                    entry.tag.key,
                    entry.tag.value,
                    entry.class.priority,
                ])
                .map_err(|source| SetupError::ExportConfiguration { source })?;
            written += 1;
        }
    }
    tx.commit()
        .map_err(|source| SetupError::ExportConfiguration { source })?;
    info!("exported {written} configuration rows into {table}");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use waygraph_core::{ClassEntry, TagClass, TagConfig};

    #[fixture]
    fn session() -> Session {
        Session::open_in_memory().expect("open session")
    }

    #[rstest]
    fn schema_creation_is_idempotent(session: Session) {
        let names = TableNames::default();
        create_schema(&session, &names).expect("first run");
        create_schema(&session, &names).expect("second run");
    }

    #[rstest]
    fn prefixed_tables_are_created(session: Session) {
        let names = TableNames::new("osm_", "_v1").expect("names");
        create_schema(&session, &names).expect("create");
        let count: i64 = session
            .connection()
            .query_row("SELECT COUNT(*) FROM osm_edges_v1", [], |row| row.get(0))
            .expect("query prefixed table");
        assert_eq!(count, 0);
    }

    #[rstest]
    fn configuration_export_replaces_existing_rows(mut session: Session) {
        let names = TableNames::default();
        create_schema(&session, &names).expect("create");

        let first = Configuration::from_entries([ClassEntry {
            tag: TagConfig::new("highway", "residential"),
            class: TagClass {
                id: 11,
                priority: 2.5,
            },
        }]);
        export_configuration(&mut session, &names, &first).expect("export");

        let updated = Configuration::from_entries([ClassEntry {
            tag: TagConfig::new("highway", "residential"),
            class: TagClass {
                id: 11,
                priority: 3.0,
            },
        }]);
        export_configuration(&mut session, &names, &updated).expect("re-export");

        let (rows, priority): (i64, f64) = session
            .connection()
            .query_row(
                "SELECT COUNT(*), MAX(priority) FROM configuration",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("read configuration");
        assert_eq!(rows, 1);
        assert_eq!(priority, 3.0);
    }

    #[rstest]
    fn drop_schema_removes_everything(session: Session) {
        let names = TableNames::default();
        create_schema(&session, &names).expect("create");
        drop_schema(&session, &names).expect("drop");
        let result: Result<i64, _> =
            session
                .connection()
                .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0));
        assert!(result.is_err());
    }
}

//! Explicit store session with a defined lifetime.
//!
//! A [`Session`] owns the SQLite connection for one ingestion run: it enables
//! foreign-key enforcement, registers the geometry SQL function the resolver
//! relies on, and hands out the per-chunk transactions. It is passed to every
//! component that touches the store; nothing here is process-global.
//!
//! Table names are derived through [`TableNames`], which validates the
//! configured prefix and suffix before they are ever interpolated into SQL.
//! All values travel as bound parameters.

use std::path::{Path, PathBuf};

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Transaction};
use thiserror::Error;
use waygraph_core::geometry::{linestring_length_m, parse_linestring_wkt};

/// Errors raised when opening or configuring a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Opening an in-memory database failed.
    #[error("failed to open in-memory SQLite database")]
    OpenInMemory {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Enabling SQLite foreign keys failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Registering the geometry SQL function failed.
    #[error("failed to register the {name} SQL function")]
    RegisterFunction {
        /// Name of the function being registered.
        name: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Owner of the store connection for one ingestion run.
pub struct Session {
    connection: Connection,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session against a database file, creating it if missing.
    pub fn open(path: &Path) -> Result<Self, SessionError> {
        let connection = Connection::open(path).map_err(|source| SessionError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::configure(connection)
    }

    /// Open a session against a private in-memory database.
    pub fn open_in_memory() -> Result<Self, SessionError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SessionError::OpenInMemory { source })?;
        Self::configure(connection)
    }

    fn configure(connection: Connection) -> Result<Self, SessionError> {
        connection
            .pragma_update(None, "foreign_keys", true)
            .map_err(|source| SessionError::ForeignKeys { source })?;
        register_geometry_functions(&connection)?;
        Ok(Self { connection })
    }

    /// Begin one chunk's atomic unit of work.
    ///
    /// Dropping the returned transaction without committing rolls the chunk
    /// back, including any staging table created inside it.
    pub fn unit_of_work(&mut self) -> Result<Transaction<'_>, rusqlite::Error> {
        self.connection.transaction()
    }

    /// Borrow the underlying connection for reads outside a unit of work.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

/// Register `linestring_length_m(wkt)`, the deterministic scalar function the
/// resolver's set-based cost update calls per staged row.
fn register_geometry_functions(connection: &Connection) -> Result<(), SessionError> {
    connection
        .create_scalar_function(
            "linestring_length_m",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |context| {
                let text: String = context.get(0)?;
                let coords = parse_linestring_wkt(&text)
                    .map_err(|error| rusqlite::Error::UserFunctionError(Box::new(error)))?;
                Ok(linestring_length_m(&coords))
            },
        )
        .map_err(|source| SessionError::RegisterFunction {
            name: "linestring_length_m",
            source,
        })
}

/// Errors raised when validating a configured table prefix or suffix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableNameError {
    /// The prefix or suffix contains characters unsafe in an identifier.
    #[error("table name {part} {value:?} may only contain ASCII letters, digits, and underscores")]
    InvalidCharacters {
        /// Which part failed validation, `prefix` or `suffix`.
        part: &'static str,
        /// The offending value.
        value: String,
    },
    /// The prefix would make the table name start with a digit.
    #[error("table name prefix {value:?} must not start with a digit")]
    LeadingDigit {
        /// The offending value.
        value: String,
    },
}

/// Validated table names derived from a configured prefix and suffix.
///
/// # Examples
/// ```
/// use waygraph_ingest::TableNames;
///
/// let names = TableNames::new("osm_", "_2024")?;
/// assert_eq!(names.edges(), "osm_edges_2024");
/// assert_eq!(names.vertices(), "osm_vertices_2024");
/// # Ok::<(), waygraph_ingest::TableNameError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    vertices: String,
    edges: String,
    edges_bbox: String,
    configuration: String,
    staging: String,
    staging_bbox: String,
}

impl TableNames {
    /// Validate the prefix and suffix and derive the table names.
    pub fn new(prefix: &str, suffix: &str) -> Result<Self, TableNameError> {
        validate_identifier_part("prefix", prefix)?;
        validate_identifier_part("suffix", suffix)?;
        if prefix.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
            return Err(TableNameError::LeadingDigit {
                value: prefix.to_owned(),
            });
        }
        let derive = |base: &str| format!("{prefix}{base}{suffix}");
        Ok(Self {
            vertices: derive("vertices"),
            edges: derive("edges"),
            edges_bbox: derive("edges_bbox"),
            configuration: derive("configuration"),
            staging: derive("edges_staging"),
            staging_bbox: derive("edges_staging_bbox"),
        })
    }

    /// Permanent vertex table.
    pub fn vertices(&self) -> &str {
        &self.vertices
    }

    /// Permanent edge table.
    pub fn edges(&self) -> &str {
        &self.edges
    }

    /// R*Tree mirror of the edge bounding boxes.
    pub fn edges_bbox(&self) -> &str {
        &self.edges_bbox
    }

    /// Tag→class configuration table.
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Chunk-scoped staging table (always in the `temp` schema).
    pub fn staging(&self) -> &str {
        &self.staging
    }

    /// R*Tree over the staged bounding boxes (always in the `temp` schema).
    pub fn staging_bbox(&self) -> &str {
        &self.staging_bbox
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            vertices: "vertices".to_owned(),
            edges: "edges".to_owned(),
            edges_bbox: "edges_bbox".to_owned(),
            configuration: "configuration".to_owned(),
            staging: "edges_staging".to_owned(),
            staging_bbox: "edges_staging_bbox".to_owned(),
        }
    }
}

fn validate_identifier_part(part: &'static str, value: &str) -> Result<(), TableNameError> {
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        Ok(())
    } else {
        Err(TableNameError::InvalidCharacters {
            part,
            value: value.to_owned(),
        })
    }
}

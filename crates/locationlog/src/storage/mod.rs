//! Storage layer for locationlog.
//!
//! This module provides `SQLite`-based persistent storage for location
//! records. The store is append-only: records are inserted and read back,
//! never updated or deleted.

pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::location::LocationRecord;

/// How long a writer waits on a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistent store for location records.
///
/// Owns a single connection behind a mutex, so inserts from concurrent
/// requests are serialized and id assignment is atomic per insert. Share it
/// across tasks with an `Arc`.
#[derive(Debug)]
pub struct LocationStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl LocationStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and ensures the locations table is present. Safe to call on every
    /// start.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(schema::FILE_PRAGMAS)?;
        schema::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a new reading, assigning its id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, latitude: f64, longitude: f64) -> Result<LocationRecord> {
        let conn = self.lock()?;

        let timestamp = Utc::now();
        conn.execute(
            "INSERT INTO locations (latitude, longitude, timestamp) VALUES (?1, ?2, ?3)",
            params![
                latitude,
                longitude,
                timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Inserted location with id {}", id);

        Ok(LocationRecord {
            id,
            latitude,
            longitude,
            timestamp,
        })
    }

    /// Get the most recently inserted record.
    ///
    /// "Most recent" means highest id, not newest timestamp. Returns `None`
    /// when the store is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn fetch_latest(&self) -> Result<Option<LocationRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                r"
                SELECT id, latitude, longitude, timestamp
                FROM locations ORDER BY id DESC LIMIT 1
                ",
                [],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Count stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))?;
        Ok(count)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database connection lock poisoned"))
    }

    /// Convert a database row to a `LocationRecord`.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<LocationRecord> {
        let id: i64 = row.get(0)?;
        let latitude: f64 = row.get(1)?;
        let longitude: f64 = row.get(2)?;
        let timestamp_str: String = row.get(3)?;

        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        Ok(LocationRecord {
            id,
            latitude,
            longitude,
            timestamp,
        })
    }
}

//! `SQLite` schema definitions for locationlog.

use rusqlite::Connection;

use crate::error::Result;

/// SQL statement to create the locations table.
///
/// `AUTOINCREMENT` keeps ids from being reused even if rows are removed
/// out of band.
pub const CREATE_LOCATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    timestamp TEXT NOT NULL
)
";

/// Connection pragmas applied to file-backed databases.
pub const FILE_PRAGMAS: &str = "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;";

/// Create the schema if it doesn't exist yet.
///
/// # Errors
///
/// Returns an error if the statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_LOCATIONS_TABLE, [])?;
    Ok(())
}

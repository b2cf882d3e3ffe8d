//! SQLite relational store.
//!
//! The database is written once by [`seed::create_database`] and only read
//! while serving. Readers open a connection per call and drop it on return.

pub mod catalog;
pub mod schema;
pub mod seed;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Open an existing database for reading.
pub fn open_read_only(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open database {}", path.display()))
}

/// Check that the database exists and carries every table the service reads.
pub fn verify(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("database {} not found", path.display());
    }
    let conn = open_read_only(path)?;
    for table in schema::TABLES {
        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to inspect database {}", path.display()))?;
        if found == 0 {
            anyhow::bail!("database {} has no `{table}` table", path.display());
        }
    }
    Ok(())
}

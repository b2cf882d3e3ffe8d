use anyhow::{Context, Result};
use rusqlite::Connection;

/// Tables read at serving time, in dependency order.
pub const TABLES: [&str; 3] = ["universities", "courses", "requirements"];

const SCHEMA: &str = r"
CREATE TABLE universities (
    university_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    city TEXT,
    state TEXT
);

CREATE TABLE courses (
    course_id INTEGER PRIMARY KEY AUTOINCREMENT,
    university_id INTEGER,
    name TEXT NOT NULL,
    language TEXT,
    description TEXT,
    FOREIGN KEY (university_id) REFERENCES universities (university_id)
);

CREATE TABLE requirements (
    requirement_id INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id INTEGER,
    required_grade REAL,
    language_level TEXT,
    FOREIGN KEY (course_id) REFERENCES courses (course_id)
);
";

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)
        .context("Failed to create tables")?;
    for table in TABLES {
        tracing::debug!("Table {table} created");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_enforces_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let orphan = conn.execute(
            "INSERT INTO courses (university_id, name) VALUES (99, 'Orphan')",
            [],
        );
        assert!(orphan.is_err());
    }
}

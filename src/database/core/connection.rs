//! Database connection management
//!
//! This module provides the core database connection wrapper used throughout
//! otacache.

use std::path::Path;

use anyhow::{anyhow, Result};
use rusqlite::Connection;

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections, handling
/// both file-based and in-memory databases with consistent error handling.
///
/// Opening a file-based connection probes the database header immediately, so
/// a corrupted or non-database file fails at open time with the corresponding
/// SQLite error code rather than on first use. The initializer relies on this
/// to classify open failures.
#[derive(Debug)]
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database file at the given path, creating it if absent.
    ///
    /// Returns the raw `rusqlite::Error` so callers can inspect the SQLite
    /// result code (the initializer distinguishes corruption from other open
    /// failures).
    pub fn open_path(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        let db = DatabaseConn { conn };
        db.probe()?;
        Ok(db)
    }

    /// Create an in-memory database.
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(DatabaseConn { conn })
    }

    /// Force SQLite to read the database header.
    ///
    /// SQLite opens files lazily; a garbage file only fails once the first
    /// statement touches it. `PRAGMA schema_version` reads the header without
    /// modifying anything.
    fn probe(&self) -> rusqlite::Result<()> {
        self.conn
            .query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Enable foreign key enforcement on this connection.
    ///
    /// SQLite requires this per connection; it is never inherited from the
    /// database file.
    pub fn enable_foreign_keys(&self) -> rusqlite::Result<()> {
        self.conn.execute("PRAGMA foreign_keys=ON", [])?;
        Ok(())
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table_name],
                |row| row.get(0),
            )
            .map_err(|e| anyhow!("Failed to check table existence: {}", e))?;
        Ok(count > 0)
    }

    /// Get the row count for a table
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: u64 = self
            .conn
            .query_row(&query, [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get table count: {}", e))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_path_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");

        let db = DatabaseConn::open_path(&path).unwrap();
        drop(db);

        assert!(path.exists());
    }

    #[test]
    fn test_open_path_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.db");
        fs::write(&path, b"this is definitely not a database file").unwrap();

        let err = DatabaseConn::open_path(&path).unwrap_err();
        match err {
            rusqlite::Error::SqliteFailure(e, _) => {
                assert_eq!(e.code, rusqlite::ErrorCode::NotADatabase);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.conn
            .execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)", [])
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_table_count() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.conn
            .execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)", [])
            .unwrap();
        db.conn
            .execute("INSERT INTO test_table (id) VALUES (1), (2), (3)", [])
            .unwrap();

        assert_eq!(db.table_count("test_table").unwrap(), 3);
    }

    #[test]
    fn test_foreign_keys_enforced_after_enable() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.enable_foreign_keys().unwrap();
        db.conn
            .execute_batch(
                r#"
                CREATE TABLE parent (id INTEGER PRIMARY KEY);
                CREATE TABLE child (
                    id INTEGER PRIMARY KEY,
                    parent_id INTEGER NOT NULL REFERENCES parent(id)
                );
                "#,
            )
            .unwrap();

        let orphan = db
            .conn
            .execute("INSERT INTO child (id, parent_id) VALUES (1, 42)", []);
        assert!(orphan.is_err());
    }
}

//! Database module
//!
//! This module provides all database functionality for otacache, organized
//! into:
//!
//! - **core**: Core database infrastructure (SQLite connections, schema
//!   definitions, the migration driver, and the initializer)
//! - **migrations**: The shipped forward-only migration chain
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/            # Foundation
//! │   ├── connection   # SQLite DatabaseConn wrapper
//! │   ├── initializer  # Top-level initialization and corruption recovery
//! │   ├── migration    # Migration trait and chain driver
//! │   ├── schema       # Current schema DDL and canonical filename
//! │   └── utils        # Statement execution helpers
//! │
//! └── migrations/      # One step per schema version bump (v4 through v9)
//! ```
//!
//! # Usage
//!
//! The [`OtaCacheDatabase`] handle is the primary entry point:
//!
//! ```rust,ignore
//! use otacache::database::OtaCacheDatabase;
//!
//! // Open the cache database, creating/migrating/recovering as needed
//! let db = OtaCacheDatabase::open_in_dir("~/.otacache")?;
//!
//! // Query through the raw connection
//! let count: u64 = db
//!     .connection()
//!     .query_row("SELECT COUNT(*) FROM updates", [], |row| row.get(0))?;
//! ```
//!
//! Callers that manage their own schema or migration chain can use
//! [`initialize_database`] directly.

pub mod core;
pub mod migrations;

// Core database types
pub use self::core::{
    initialize_database, initialize_database_with_latest_schema, migrate_database, verify_schema,
    DatabaseConn, InitializeError, Migration, MigrationOutcome, LATEST_DB_FILENAME, LATEST_SCHEMA,
    REQUIRED_TABLES, SCHEMA_VERSION,
};

// Shipped migration chain
pub use migrations::{
    migration_registry, MigrateV4ToV5, MigrateV5ToV6, MigrateV6ToV7, MigrateV7ToV8, MigrateV8ToV9,
};

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Serialize;

/// Main handle to the update cache database
///
/// `OtaCacheDatabase` wraps an initialized connection to the canonical latest
/// database file. Opening it runs the full initialization sequence: migration
/// of older versioned files, corruption recovery, and schema creation, so a
/// successfully constructed handle always points at a current-schema database.
pub struct OtaCacheDatabase {
    db: DatabaseConn,
    path: Option<PathBuf>,
}

impl OtaCacheDatabase {
    /// Open the cache database inside a data directory, creating the
    /// directory if needed.
    ///
    /// The database file is `{data_dir}/updates-v9.db` for the current schema
    /// version.
    pub fn open_in_dir(data_dir: &str) -> Result<Self> {
        ensure_data_dir(data_dir)?;
        let directory = Path::new(data_dir);
        let db = initialize_database_with_latest_schema(directory)?;
        Ok(Self {
            db,
            path: Some(directory.join(LATEST_DB_FILENAME)),
        })
    }

    /// Open the cache database in the configured data directory.
    ///
    /// Resolves the directory through [`OtaCacheConfig`](crate::OtaCacheConfig)
    /// (`~/.otacache` unless overridden by the config file or
    /// `OTACACHE_DATA_DIR`).
    pub fn open_default() -> Result<Self> {
        let config = crate::config::OtaCacheConfig::new(&None)?;
        Self::open_in_dir(&config.data_dir)
    }

    /// Create an in-memory cache database with the current schema (for
    /// testing).
    pub fn open_in_memory() -> Result<Self> {
        let db = DatabaseConn::open_in_memory()?;
        db.enable_foreign_keys()?;
        db.conn
            .execute_batch(LATEST_SCHEMA)
            .map_err(|e| anyhow!("Failed to create schema: {}", e))?;
        Ok(Self { db, path: None })
    }

    /// Get the underlying database connection.
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.db.conn
    }

    /// Snapshot of the database state for diagnostics.
    pub fn info(&self) -> Result<DatabaseInfo> {
        let file_size_bytes = match &self.path {
            Some(p) => std::fs::metadata(p)
                .map_err(|e| anyhow!("Failed to read database file metadata: {}", e))?
                .len(),
            None => 0,
        };

        Ok(DatabaseInfo {
            path: self.path.as_ref().map(|p| p.display().to_string()),
            schema_version: SCHEMA_VERSION,
            file_size_bytes,
            update_count: self.db.table_count("updates")?,
            asset_count: self.db.table_count("assets")?,
        })
    }
}

/// Diagnostic information about an open cache database
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseInfo {
    /// Path of the database file; `None` for in-memory databases.
    pub path: Option<String>,
    pub schema_version: u32,
    pub file_size_bytes: u64,
    pub update_count: u64,
    pub asset_count: u64,
}

/// Ensure the data directory exists
pub fn ensure_data_dir(data_dir: &str) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow!("Failed to create data directory '{}': {}", data_dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_in_memory() {
        let db = OtaCacheDatabase::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_in_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("nested").join("cache");

        let db = OtaCacheDatabase::open_in_dir(&data_dir.to_string_lossy()).unwrap();
        assert!(data_dir.join(LATEST_DB_FILENAME).exists());
        assert!(verify_schema(db.connection()).unwrap());
    }

    #[test]
    fn test_info_counts_rows() {
        let db = OtaCacheDatabase::open_in_memory().unwrap();
        db.connection()
            .execute(
                "INSERT INTO assets (type, download_time, relative_path, hash, hash_type, marked_for_deletion)
                 VALUES ('js', 0, 'bundle.js', x'ab', 0, 0)",
                [],
            )
            .unwrap();

        let info = db.info().unwrap();
        assert_eq!(info.update_count, 0);
        assert_eq!(info.asset_count, 1);
        assert_eq!(info.schema_version, SCHEMA_VERSION);
        assert!(info.path.is_none());
    }

    #[test]
    fn test_info_serializes() {
        let db = OtaCacheDatabase::open_in_memory().unwrap();
        let info = db.info().unwrap();

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"schema_version\":9"));
    }
}

//! Database schema definitions
//!
//! This module defines the current cache database schema and the canonical
//! filename tied to it. The filename encodes the schema version; bumping
//! [`SCHEMA_VERSION`] means introducing a new canonical filename and adding a
//! migration step for the previous one (see `database::migrations`).

use anyhow::{anyhow, Result};
use rusqlite::Connection;

/// Current schema version.
///
/// Increment this when making breaking schema changes, and keep
/// [`LATEST_DB_FILENAME`] in sync.
pub const SCHEMA_VERSION: u32 = 9;

/// Canonical filename of the current database version.
///
/// This is the single filename the running code treats as "the current
/// database". Older versioned filenames are only ever read by the migration
/// driver.
pub const LATEST_DB_FILENAME: &str = "updates-v9.db";

/// Full DDL for the current schema version, executed as a single batch when a
/// fresh database is created.
///
/// The schema stores downloaded updates, their assets, the many-to-many
/// relation between them, and scoped JSON key-value data used by the host
/// application.
pub const LATEST_SCHEMA: &str = r#"
CREATE TABLE "updates" (
  "id"  BLOB UNIQUE,
  "scope_key"  TEXT NOT NULL,
  "commit_time"  INTEGER NOT NULL,
  "runtime_version"  TEXT NOT NULL,
  "launch_asset_id" INTEGER,
  "manifest"  TEXT,
  "status"  INTEGER NOT NULL,
  "keep"  INTEGER NOT NULL,
  "last_accessed"  INTEGER NOT NULL,
  "successful_launch_count"  INTEGER NOT NULL DEFAULT 0,
  "failed_launch_count"  INTEGER NOT NULL DEFAULT 0,
  PRIMARY KEY("id"),
  FOREIGN KEY("launch_asset_id") REFERENCES "assets"("id") ON DELETE CASCADE
);
CREATE TABLE "assets" (
  "id"  INTEGER PRIMARY KEY AUTOINCREMENT,
  "url"  TEXT,
  "key"  TEXT UNIQUE,
  "headers"  TEXT,
  "expected_hash"  TEXT,
  "extra_request_headers"  TEXT,
  "type"  TEXT NOT NULL,
  "metadata"  TEXT,
  "download_time"  INTEGER NOT NULL,
  "relative_path"  TEXT NOT NULL,
  "hash"  BLOB NOT NULL,
  "hash_type"  INTEGER NOT NULL,
  "marked_for_deletion"  INTEGER NOT NULL
);
CREATE TABLE "updates_assets" (
  "update_id"  BLOB NOT NULL,
  "asset_id" INTEGER NOT NULL,
  FOREIGN KEY("update_id") REFERENCES "updates"("id") ON DELETE CASCADE,
  FOREIGN KEY("asset_id") REFERENCES "assets"("id") ON DELETE CASCADE
);
CREATE TABLE "json_data" (
  "id" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
  "key" TEXT NOT NULL,
  "value" TEXT NOT NULL,
  "last_updated" INTEGER NOT NULL,
  "scope_key" TEXT NOT NULL
);
CREATE UNIQUE INDEX "index_updates_scope_key_commit_time" ON "updates" ("scope_key", "commit_time");
CREATE INDEX "index_updates_launch_asset_id" ON "updates" ("launch_asset_id");
CREATE INDEX "index_json_data_scope_key" ON "json_data" ("scope_key");
"#;

/// Tables every current-version database must contain.
pub const REQUIRED_TABLES: &[&str] = &["updates", "assets", "updates_assets", "json_data"];

/// Verify that all required tables exist on the given connection.
pub fn verify_schema(conn: &Connection) -> Result<bool> {
    for table in REQUIRED_TABLES {
        let exists: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .map_err(|e| anyhow!("Failed to check table existence: {}", e))?;
        if exists == 0 {
            return Ok(false);
        }
    }
    Ok(true)
}

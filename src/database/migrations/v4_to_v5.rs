//! Migration from the v4 database format
//!
//! The v4 schema required every asset to carry a download `url` and request
//! `headers`. Assets embedded in the host application bundle have neither, so
//! v5 makes both columns nullable. SQLite cannot relax a NOT NULL constraint
//! in place; the table is rebuilt following the documented recipe, keeping the
//! inbound foreign keys from `updates` and `updates_assets` intact.

use anyhow::Result;
use rusqlite::Connection;

use crate::database::core::utils;
use crate::database::core::Migration;

const SQL: &str = r#"
PRAGMA foreign_keys=OFF;
BEGIN;
CREATE TABLE "new_assets" (
  "id"  INTEGER PRIMARY KEY AUTOINCREMENT,
  "url"  TEXT,
  "key"  TEXT UNIQUE,
  "headers"  TEXT,
  "type"  TEXT NOT NULL,
  "metadata"  TEXT,
  "download_time"  INTEGER NOT NULL,
  "relative_path"  TEXT NOT NULL,
  "hash"  BLOB NOT NULL,
  "hash_type"  INTEGER NOT NULL,
  "marked_for_deletion"  INTEGER NOT NULL
);
INSERT INTO "new_assets" ("id", "url", "key", "headers", "type", "metadata", "download_time", "relative_path", "hash", "hash_type", "marked_for_deletion")
  SELECT "id", "url", "key", "headers", "type", "metadata", "download_time", "relative_path", "hash", "hash_type", "marked_for_deletion"
  FROM "assets";
DROP TABLE "assets";
ALTER TABLE "new_assets" RENAME TO "assets";
COMMIT;
PRAGMA foreign_keys=ON;
"#;

/// Rebuilds `assets` so that `url` and `headers` are nullable.
pub struct MigrateV4ToV5;

impl Migration for MigrateV4ToV5 {
    fn filename(&self) -> &'static str {
        "updates-v4.db"
    }

    fn migrate(&self, conn: &Connection) -> Result<()> {
        utils::execute_batch(conn, SQL, "rebuild assets table with nullable url and headers")
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{table_columns, V4_SCHEMA};
    use super::*;

    #[test]
    fn test_url_nullable_after_migration() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(V4_SCHEMA).unwrap();

        MigrateV4ToV5.migrate(&conn).unwrap();

        conn.execute(
            "INSERT INTO assets (url, key, headers, type, download_time, relative_path, hash, hash_type, marked_for_deletion)
             VALUES (NULL, 'embedded', NULL, 'js', 0, 'bundle.js', x'ab', 0, 0)",
            [],
        )
        .unwrap();
    }

    #[test]
    fn test_rows_and_foreign_keys_preserved() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys=ON", []).unwrap();
        conn.execute_batch(V4_SCHEMA).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO assets (url, key, headers, type, download_time, relative_path, hash, hash_type, marked_for_deletion)
            VALUES ('https://example.com/a.js', 'a', '{}', 'js', 1, 'a.js', x'01', 0, 0);
            INSERT INTO updates (id, scope_key, commit_time, runtime_version, launch_asset_id, status, keep)
            VALUES (x'01', 'default', 1, '1.0.0', 1, 1, 1);
            "#,
        )
        .unwrap();

        MigrateV4ToV5.migrate(&conn).unwrap();

        let key: String = conn
            .query_row("SELECT key FROM assets WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(key, "a");

        // The updates row still references the rebuilt table.
        let orphan = conn.execute(
            "INSERT INTO updates (id, scope_key, commit_time, runtime_version, launch_asset_id, status, keep)
             VALUES (x'02', 'default', 2, '1.0.0', 99, 1, 1)",
            [],
        );
        assert!(orphan.is_err());

        assert_eq!(table_columns(&conn, "assets").len(), 11);
    }
}

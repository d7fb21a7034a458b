//! Migration from the v5 database format
//!
//! v6 starts tracking when an update was last launched so that reaper logic
//! can evict stale updates. Rows that predate the column are backfilled with
//! the migration time rather than zero, which would make every existing
//! update immediately eligible for eviction.

use anyhow::Result;
use rusqlite::Connection;

use crate::database::core::utils;
use crate::database::core::Migration;

const SQL: &str = r#"
BEGIN;
ALTER TABLE "updates" ADD COLUMN "last_accessed" INTEGER NOT NULL DEFAULT 0;
UPDATE "updates" SET "last_accessed" = CAST(strftime('%s', 'now') AS INTEGER) * 1000;
COMMIT;
"#;

/// Adds `last_accessed` to `updates`, backfilled with the current time.
pub struct MigrateV5ToV6;

impl Migration for MigrateV5ToV6 {
    fn filename(&self) -> &'static str {
        "updates-v5.db"
    }

    fn migrate(&self, conn: &Connection) -> Result<()> {
        utils::execute_batch(conn, SQL, "add last_accessed column to updates table")
    }
}

//! Migration from the v6 database format
//!
//! v7 adds launch counters to `updates` so the loader can detect updates that
//! repeatedly fail to start and roll back to an embedded one. Rows that
//! existed before the counters are seeded with one successful launch; they
//! were launchable when they were recorded.

use anyhow::Result;
use rusqlite::Connection;

use crate::database::core::utils;
use crate::database::core::Migration;

const SQL: &str = r#"
BEGIN;
ALTER TABLE "updates" ADD COLUMN "successful_launch_count" INTEGER NOT NULL DEFAULT 0;
ALTER TABLE "updates" ADD COLUMN "failed_launch_count" INTEGER NOT NULL DEFAULT 0;
UPDATE "updates" SET "successful_launch_count" = 1;
COMMIT;
"#;

/// Adds `successful_launch_count` and `failed_launch_count` to `updates`.
pub struct MigrateV6ToV7;

impl Migration for MigrateV6ToV7 {
    fn filename(&self) -> &'static str {
        "updates-v6.db"
    }

    fn migrate(&self, conn: &Connection) -> Result<()> {
        utils::execute_batch(conn, SQL, "add launch count columns to updates table")
    }
}

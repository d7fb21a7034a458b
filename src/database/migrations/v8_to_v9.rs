//! Migration from the v8 database format
//!
//! v9 records the hash an asset is expected to have before it is downloaded,
//! so a tampered or truncated download can be rejected. Existing assets keep
//! a NULL expectation and are verified against their stored hash only.

use anyhow::Result;
use rusqlite::Connection;

use crate::database::core::utils;
use crate::database::core::Migration;

const SQL: &str = r#"
ALTER TABLE "assets" ADD COLUMN "expected_hash" TEXT;
"#;

/// Adds `expected_hash` to `assets`.
pub struct MigrateV8ToV9;

impl Migration for MigrateV8ToV9 {
    fn filename(&self) -> &'static str {
        "updates-v8.db"
    }

    fn migrate(&self, conn: &Connection) -> Result<()> {
        utils::execute_batch(conn, SQL, "add expected_hash column to assets table")
    }
}

//! Migration from the v7 database format
//!
//! v8 lets individual assets carry extra request headers for their download,
//! serialized as JSON. Existing assets have none.

use anyhow::Result;
use rusqlite::Connection;

use crate::database::core::utils;
use crate::database::core::Migration;

const SQL: &str = r#"
ALTER TABLE "assets" ADD COLUMN "extra_request_headers" TEXT;
"#;

/// Adds `extra_request_headers` to `assets`.
pub struct MigrateV7ToV8;

impl Migration for MigrateV7ToV8 {
    fn filename(&self) -> &'static str {
        "updates-v7.db"
    }

    fn migrate(&self, conn: &Connection) -> Result<()> {
        utils::execute_batch(conn, SQL, "add extra_request_headers column to assets table")
    }
}

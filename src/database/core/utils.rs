//! Statement execution helpers
//!
//! Thin wrappers around `rusqlite` execution that attach the failing operation
//! and the extended SQLite result code to error messages. Migration steps use
//! these so that a failure deep inside a multi-statement batch still names
//! what was being attempted.

use anyhow::{anyhow, Result};
use rusqlite::Connection;

/// Execute a batch of SQL statements, naming the operation in any error.
pub fn execute_batch(conn: &Connection, sql: &str, operation: &str) -> Result<()> {
    conn.execute_batch(sql)
        .map_err(|e| anyhow!("Failed to {}: {}", operation, format_sqlite_error(&e)))
}

/// Render a `rusqlite` error with its extended SQLite result code when one is
/// available.
pub fn format_sqlite_error(err: &rusqlite::Error) -> String {
    match err {
        rusqlite::Error::SqliteFailure(code, Some(msg)) => {
            format!("{} (code {})", msg, code.extended_code)
        }
        rusqlite::Error::SqliteFailure(code, None) => {
            format!("{} (code {})", code, code.extended_code)
        }
        other => other.to_string(),
    }
}

//! Database initialization
//!
//! Top-level orchestration that turns whatever is on disk into an open
//! connection with the current schema: runs the migration driver, discards
//! unusable leftovers, recovers from corrupted files by archiving them, and
//! creates a fresh schema when needed.
//!
//! A single call either returns a ready connection or fails with one
//! [`InitializeError`]; there is no retry loop. The caller must guarantee
//! exclusive access to the directory for the duration of the call.

use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use super::connection::DatabaseConn;
use super::migration::{migrate_database, Migration, MigrationOutcome};
use super::schema::{LATEST_DB_FILENAME, LATEST_SCHEMA};
use crate::database::migrations::migration_registry;

/// Fatal initialization failures.
///
/// Everything not listed here is absorbed internally: a failed migration step
/// or a corrupted database file degrades to a fresh, empty database instead of
/// an error.
#[derive(Debug, Error)]
pub enum InitializeError {
    /// Deleting a stale or partially migrated file before reinitialization
    /// failed.
    #[error("failed to remove stale database file before reinitialization: {0}")]
    RemoveStaleDatabase(#[source] std::io::Error),

    /// A corrupted database file could not be renamed out of the way.
    #[error("failed to archive corrupted database file: {0}")]
    ArchiveCorruptDatabase(#[source] std::io::Error),

    /// Creating a fresh database after archiving the corrupted one failed.
    #[error("failed to open a fresh database after archiving the corrupted one: {0}")]
    ReopenAfterArchive(#[source] rusqlite::Error),

    /// Opening the canonical database failed for a reason other than
    /// corruption (e.g., permissions or I/O).
    #[error("failed to open database: {0}")]
    Open(#[source] rusqlite::Error),

    /// Executing the schema DDL batch failed.
    #[error("failed to initialize database schema: {0}")]
    SchemaInitialization(#[source] rusqlite::Error),
}

/// Initialize the cache database in `directory` with the shipped schema,
/// canonical filename, and migration registry.
pub fn initialize_database_with_latest_schema(
    directory: &Path,
) -> Result<DatabaseConn, InitializeError> {
    initialize_database(
        directory,
        LATEST_SCHEMA,
        LATEST_DB_FILENAME,
        &migration_registry(),
    )
}

/// Initialize a database in `directory`, returning an open connection to the
/// canonical latest file.
///
/// Runs the migration driver first. If no current database can be produced
/// from what is on disk, any leftover file at the canonical path is discarded
/// and a fresh schema is created from `schema`. A file at the canonical path
/// that fails to open as a database is archived under a timestamped name and
/// replaced.
///
/// Foreign key enforcement is enabled on the returned connection on a
/// best-effort basis; a failure there is logged and ignored.
pub fn initialize_database(
    directory: &Path,
    schema: &str,
    latest_filename: &str,
    migrations: &[Box<dyn Migration>],
) -> Result<DatabaseConn, InitializeError> {
    let db_path = directory.join(latest_filename);

    let outcome = migrate_database(directory, latest_filename, migrations);
    if outcome == MigrationOutcome::NeedsFreshSchema && db_path.exists() {
        // Leftover from a failed migration chain; discard it and start clean.
        std::fs::remove_file(&db_path).map_err(InitializeError::RemoveStaleDatabase)?;
    }

    let (db, needs_schema) = match DatabaseConn::open_path(&db_path) {
        Ok(db) => (db, outcome == MigrationOutcome::NeedsFreshSchema),
        Err(e) if is_corruption_error(&e) => {
            warn!("Database at '{}' is corrupted: {}", db_path.display(), e);
            let db = archive_and_replace_corrupted(directory, latest_filename, &db_path)?;
            (db, true)
        }
        Err(e) => return Err(InitializeError::Open(e)),
    };

    // Foreign keys must be enabled explicitly on every connection.
    if let Err(e) = db.enable_foreign_keys() {
        warn!("Failed to enable foreign key enforcement: {}", e);
    }

    if needs_schema {
        db.conn
            .execute_batch(schema)
            .map_err(InitializeError::SchemaInitialization)?;
        info!("Created database schema at '{}'", db_path.display());
    }

    Ok(db)
}

/// Move a corrupted database file aside and create a fresh one in its place.
///
/// The corrupted file is renamed to `{unix-timestamp}-{filename}` in the same
/// directory so it stays available for diagnostics without occupying the
/// canonical path.
fn archive_and_replace_corrupted(
    directory: &Path,
    latest_filename: &str,
    db_path: &Path,
) -> Result<DatabaseConn, InitializeError> {
    let archived_filename = format!("{}-{}", Utc::now().timestamp(), latest_filename);
    let archived_path = directory.join(&archived_filename);

    std::fs::rename(db_path, &archived_path).map_err(InitializeError::ArchiveCorruptDatabase)?;
    warn!("Archived corrupted database file as '{}'", archived_filename);

    DatabaseConn::open_path(db_path).map_err(InitializeError::ReopenAfterArchive)
}

/// Whether an open failure indicates a structurally corrupted or non-database
/// file, as opposed to a permission or I/O problem.
fn is_corruption_error(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if matches!(
            e.code,
            rusqlite::ErrorCode::DatabaseCorrupt | rusqlite::ErrorCode::NotADatabase
        )
    )
}

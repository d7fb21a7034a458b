//! Migration driver
//!
//! Brings an older versioned database file in a directory up to the canonical
//! latest filename and schema by applying the registered migration chain.
//!
//! Migrations are strictly linear and forward-only. There is no rollback and
//! no partial-migration repair: any failure here is reported as
//! [`MigrationOutcome::NeedsFreshSchema`] and the initializer falls back to a
//! fresh, empty database.

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;
use tracing::{info, warn};

use super::connection::DatabaseConn;

/// A forward-only migration from one specific database version to the next.
///
/// Steps are stateless and reusable across invocations. Each step is
/// identified by the filename of the database version it migrates *from*; the
/// registry orders them oldest to newest.
pub trait Migration {
    /// Filename of the database version this step migrates from.
    fn filename(&self) -> &'static str;

    /// Apply the migration on an open connection to the database.
    ///
    /// The file has already been renamed to the canonical latest filename by
    /// the driver when this runs.
    fn migrate(&self, conn: &Connection) -> Result<()>;
}

/// Outcome of driving the migration chain against a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The canonical database is already at the latest version, either because
    /// it existed up front or because the migration chain completed.
    AlreadyCurrent,
    /// No usable database remains and the caller must create a fresh schema.
    /// Covers both a fresh install (no versioned file on disk) and a failed
    /// migration chain; the two are handled identically downstream.
    NeedsFreshSchema,
}

/// Drive the migration chain for the given directory.
///
/// Finds the newest registered database version present on disk, renames it to
/// the canonical latest filename, and applies every remaining migration step
/// in order on a single connection. Older coexisting version files are
/// ignored, never merged.
///
/// The rename happens before any step runs, so a mid-chain failure leaves a
/// partially migrated file at the canonical path. The initializer treats
/// `NeedsFreshSchema` uniformly by discarding whatever sits at that path.
pub fn migrate_database(
    directory: &Path,
    latest_filename: &str,
    migrations: &[Box<dyn Migration>],
) -> MigrationOutcome {
    let latest_path = directory.join(latest_filename);
    if latest_path.exists() {
        return MigrationOutcome::AlreadyCurrent;
    }

    // The first registered filename found on disk is the newest version
    // present; the scan stops there.
    let start = match migrations
        .iter()
        .position(|m| directory.join(m.filename()).exists())
    {
        Some(idx) => idx,
        None => return MigrationOutcome::NeedsFreshSchema,
    };

    let existing_path = directory.join(migrations[start].filename());
    // Rename within the same directory, so the move is atomic.
    if let Err(e) = std::fs::rename(&existing_path, &latest_path) {
        warn!(
            "Migration failed: could not rename '{}' to '{}': {}",
            existing_path.display(),
            latest_path.display(),
            e
        );
        return MigrationOutcome::NeedsFreshSchema;
    }

    let db = match DatabaseConn::open_path(&latest_path) {
        Ok(db) => db,
        Err(e) => {
            warn!("Migration failed: could not open renamed database: {}", e);
            return MigrationOutcome::NeedsFreshSchema;
        }
    };

    for migration in &migrations[start..] {
        if let Err(e) = migration.migrate(&db.conn) {
            warn!("Migration from '{}' failed: {}", migration.filename(), e);
            return MigrationOutcome::NeedsFreshSchema;
        }
        info!("Applied migration from '{}'", migration.filename());
    }

    MigrationOutcome::AlreadyCurrent
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use tempfile::TempDir;

    const LATEST: &str = "store-v3.db";

    /// Migration step that records its application in the database.
    struct RecordingStep {
        from: &'static str,
    }

    impl Migration for RecordingStep {
        fn filename(&self) -> &'static str {
            self.from
        }

        fn migrate(&self, conn: &Connection) -> Result<()> {
            conn.execute("INSERT INTO applied (name) VALUES (?1)", [self.from])?;
            Ok(())
        }
    }

    struct FailingStep {
        from: &'static str,
    }

    impl Migration for FailingStep {
        fn filename(&self) -> &'static str {
            self.from
        }

        fn migrate(&self, _conn: &Connection) -> Result<()> {
            Err(anyhow!("step failure"))
        }
    }

    fn registry() -> Vec<Box<dyn Migration>> {
        vec![
            Box::new(RecordingStep { from: "store-v1.db" }),
            Box::new(RecordingStep { from: "store-v2.db" }),
        ]
    }

    fn create_old_db(dir: &TempDir, filename: &str) {
        let conn = Connection::open(dir.path().join(filename)).unwrap();
        conn.execute_batch("CREATE TABLE applied (name TEXT NOT NULL)")
            .unwrap();
    }

    fn applied_steps(dir: &TempDir) -> Vec<String> {
        let conn = Connection::open(dir.path().join(LATEST)).unwrap();
        let mut stmt = conn.prepare("SELECT name FROM applied ORDER BY rowid").unwrap();
        let rows = stmt.query_map([], |row| row.get(0)).unwrap();
        rows.collect::<rusqlite::Result<Vec<String>>>().unwrap()
    }

    #[test]
    fn test_fast_path_when_latest_exists() {
        let dir = TempDir::new().unwrap();
        create_old_db(&dir, LATEST);

        let outcome = migrate_database(dir.path(), LATEST, &registry());
        assert_eq!(outcome, MigrationOutcome::AlreadyCurrent);
    }

    #[test]
    fn test_fresh_install_nothing_to_migrate() {
        let dir = TempDir::new().unwrap();

        let outcome = migrate_database(dir.path(), LATEST, &registry());
        assert_eq!(outcome, MigrationOutcome::NeedsFreshSchema);
    }

    #[test]
    fn test_full_chain_from_oldest() {
        let dir = TempDir::new().unwrap();
        create_old_db(&dir, "store-v1.db");

        let outcome = migrate_database(dir.path(), LATEST, &registry());
        assert_eq!(outcome, MigrationOutcome::AlreadyCurrent);

        assert!(dir.path().join(LATEST).exists());
        assert!(!dir.path().join("store-v1.db").exists());
        assert_eq!(applied_steps(&dir), vec!["store-v1.db", "store-v2.db"]);
    }

    #[test]
    fn test_partial_chain_from_newer_version() {
        let dir = TempDir::new().unwrap();
        create_old_db(&dir, "store-v2.db");

        let outcome = migrate_database(dir.path(), LATEST, &registry());
        assert_eq!(outcome, MigrationOutcome::AlreadyCurrent);
        assert_eq!(applied_steps(&dir), vec!["store-v2.db"]);
    }

    #[test]
    fn test_newest_version_wins_over_older() {
        let dir = TempDir::new().unwrap();
        create_old_db(&dir, "store-v1.db");
        create_old_db(&dir, "store-v2.db");

        let outcome = migrate_database(dir.path(), LATEST, &registry());
        assert_eq!(outcome, MigrationOutcome::AlreadyCurrent);

        // Only the v2 step ran; the v1 file stays on disk untouched.
        assert_eq!(applied_steps(&dir), vec!["store-v2.db"]);
        assert!(dir.path().join("store-v1.db").exists());
    }

    #[test]
    fn test_step_failure_reports_fresh_schema() {
        let dir = TempDir::new().unwrap();
        create_old_db(&dir, "store-v1.db");

        let chain: Vec<Box<dyn Migration>> = vec![
            Box::new(RecordingStep { from: "store-v1.db" }),
            Box::new(FailingStep { from: "store-v2.db" }),
        ];

        let outcome = migrate_database(dir.path(), LATEST, &chain);
        assert_eq!(outcome, MigrationOutcome::NeedsFreshSchema);

        // The rename already happened, so the partially migrated file sits at
        // the canonical path and the old name is gone.
        assert!(dir.path().join(LATEST).exists());
        assert!(!dir.path().join("store-v1.db").exists());
    }
}

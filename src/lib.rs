#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! otacache - An embedded cache database for application updates
//!
//! otacache manages the local SQLite database an application uses to track
//! downloaded over-the-air updates and their assets. It owns the hard part of
//! that job: whatever is on disk before a launch (nothing at all, a file left
//! behind by an older release, or a file that is no longer a valid database),
//! the caller always gets back an open connection with the current schema, and
//! the on-disk state is never left inconsistent.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - **[`database`]**: All database functionality
//!   - `core`: SQLite connection management, schema definitions, the migration
//!     driver, and the top-level initializer with corruption recovery
//!   - `migrations`: the shipped forward-only migration chain for older
//!     database versions
//!
//! - **[`config`]**: Configuration management (data directory resolution)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use otacache::OtaCacheDatabase;
//!
//! // Open (creating, migrating, or recovering as needed) the cache database
//! let db = OtaCacheDatabase::open_in_dir("~/.otacache")?;
//!
//! // Use the connection directly for queries
//! let count: u64 = db
//!     .connection()
//!     .query_row("SELECT COUNT(*) FROM updates", [], |row| row.get(0))?;
//! ```
//!
//! # Lower-level API
//!
//! The initializer can also be driven directly, with a custom schema and
//! migration registry:
//!
//! ```rust,ignore
//! use otacache::database::{initialize_database, migration_registry};
//! use otacache::database::{LATEST_DB_FILENAME, LATEST_SCHEMA};
//!
//! let db = initialize_database(
//!     directory,
//!     LATEST_SCHEMA,
//!     LATEST_DB_FILENAME,
//!     &migration_registry(),
//! )?;
//! ```
//!
//! # Failure model
//!
//! Anything the initializer can resolve on its own (an interrupted migration,
//! a corrupted file) degrades to a fresh, empty database rather than an error.
//! Only genuinely unresolvable conditions (see
//! [`InitializeError`](database::InitializeError)) surface to the caller, and
//! in those cases no connection is returned.

pub mod config;
pub mod database;

// =============================================================================
// Configuration
// =============================================================================

pub use config::OtaCacheConfig;

// =============================================================================
// Database Module - Re-export commonly used types
// =============================================================================

// Primary database handle
pub use database::OtaCacheDatabase;

// Core database types
pub use database::{
    initialize_database, initialize_database_with_latest_schema, DatabaseConn, DatabaseInfo,
    InitializeError, Migration, MigrationOutcome, LATEST_DB_FILENAME, SCHEMA_VERSION,
};

// Shipped migration chain
pub use database::migration_registry;

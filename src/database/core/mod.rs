//! Core database infrastructure
//!
//! This module provides the foundational database components used throughout
//! otacache:
//! - `DatabaseConn`: Core SQLite connection wrapper
//! - `initializer`: Top-level initialization with corruption recovery
//! - `migration`: Migration trait and the chain driver
//! - `schema`: Current schema DDL and the canonical filename
//! - `utils`: Statement execution helpers with uniform error formatting

mod connection;
mod initializer;
mod migration;
mod schema;
pub mod utils;

pub use connection::DatabaseConn;
pub use initializer::{
    initialize_database, initialize_database_with_latest_schema, InitializeError,
};
pub use migration::{migrate_database, Migration, MigrationOutcome};
pub use schema::{
    verify_schema, LATEST_DB_FILENAME, LATEST_SCHEMA, REQUIRED_TABLES, SCHEMA_VERSION,
};

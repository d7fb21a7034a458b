//! Shipped migration chain
//!
//! One module per schema version bump, ordered oldest to newest. Each step is
//! named by the database filename it migrates *from* and transforms that
//! schema into the next one; the full chain ends at the current schema in
//! `core::schema`.
//!
//! Adding a schema version means: bump `SCHEMA_VERSION` and
//! `LATEST_DB_FILENAME`, update `LATEST_SCHEMA`, and append a step here for
//! the previous filename.

mod v4_to_v5;
mod v5_to_v6;
mod v6_to_v7;
mod v7_to_v8;
mod v8_to_v9;

pub use v4_to_v5::MigrateV4ToV5;
pub use v5_to_v6::MigrateV5ToV6;
pub use v6_to_v7::MigrateV6ToV7;
pub use v7_to_v8::MigrateV7ToV8;
pub use v8_to_v9::MigrateV8ToV9;

use crate::database::core::Migration;

/// The shipped migration registry, oldest version first.
pub fn migration_registry() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(MigrateV4ToV5),
        Box::new(MigrateV5ToV6),
        Box::new(MigrateV6ToV7),
        Box::new(MigrateV7ToV8),
        Box::new(MigrateV8ToV9),
    ]
}

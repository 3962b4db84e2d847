//! Schema versioning and catch-up migration.
//!
//! This module brings a database to a declared target version by applying
//! numbered SQL scripts in order: probe the applied version, chunk each
//! pending script into batches, and execute the whole catch-up inside one
//! transaction.

pub mod batch;
pub mod probe;
pub mod runner;
pub mod source;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

/// Version reported for a database with no version object installed.
pub const NOT_INSTALLED: u32 = 0;

pub use batch::{split_batches, Batches};
pub use probe::{VersionProbe, VersionView};
pub use runner::{MigrationConfig, Migrator};
pub use source::{EmbeddedScripts, ScriptDir, ScriptSource};

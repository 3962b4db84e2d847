#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # catchup
//!
//! Schema catch-up migrations and transactional access for SQLite.
//!
//! An application declares a target schema version and a source of numbered
//! SQL migration scripts; the first database call in a process brings the
//! schema to the target version exactly once, inside a single transaction.
//! All access then runs through scoped connection/transaction lifecycles
//! with parameterized commands.
//!
//! ## Core Types
//!
//! - [`Datastore`]: the entry point — run/query call shapes, blocking and
//!   async, with or without a transaction
//! - [`Migrator`] and [`MigrationConfig`]: the catch-up orchestrator
//! - [`ScriptSource`], [`ScriptDir`], [`EmbeddedScripts`]: where migration
//!   scripts come from
//! - [`Command`]: SQL templates with safely bound positional arguments
//! - [`Session`]: the execution handle lent to caller logic
//!
//! ## Examples
//!
//! ```
//! use catchup::Command;
//!
//! // One `{}` hole per argument; values are bound, never interpolated.
//! let command = Command::new("SELECT full_name FROM person WHERE email = {}")
//!     .arg("bruce@example.com".to_string());
//! ```
//!
//! Migration scripts are ordinary SQL with `GO` batch separators:
//!
//! ```
//! use catchup::split_batches;
//!
//! let script = "CREATE TABLE person (email TEXT NOT NULL);\nGO\nCREATE VIEW schema_version AS SELECT 1;\nGO\n";
//! assert_eq!(split_batches(script).count(), 2);
//! ```

pub mod command;
pub mod config;
pub mod database;
pub mod error;
pub mod migrate;

// Re-export key types at crate root for convenience
pub use command::Command;
pub use config::{DatabaseSettings, MigrationSettings, StoreSettings};
pub use database::{
    default_data_dir, resolve_database_path, Datastore, DatabaseConfig, PreparedQuery, Session,
    TransactionContext,
};
pub use error::{Error, Result};
pub use migrate::{
    split_batches, Batches, EmbeddedScripts, MigrationConfig, Migrator, ScriptDir, ScriptSource,
    VersionProbe, VersionView, NOT_INSTALLED,
};

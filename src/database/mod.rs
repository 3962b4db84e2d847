//! Connection plumbing and the scoped execution surface.
//!
//! This module provides the connection configuration, the per-call
//! connection opener, the [`Session`] execution handle lent to caller
//! logic, and the [`Datastore`] entry type that ties migration and access
//! together.
//!
//! # Examples
//!
//! ```no_run
//! use catchup::{
//!     Command, Datastore, DatabaseConfig, EmbeddedScripts, MigrationConfig, Migrator,
//! };
//!
//! # fn demo() -> catchup::Result<()> {
//! let bootstrap = "CREATE TABLE note (body TEXT NOT NULL);\n\
//!                  GO\n\
//!                  CREATE VIEW schema_version AS SELECT 1 AS version;\n\
//!                  GO\n";
//! let migrator = Migrator::new(MigrationConfig::new(1), EmbeddedScripts::new([bootstrap]));
//! let store = Datastore::new(DatabaseConfig::new("/tmp/notes.db"), migrator);
//!
//! store.run(|session| {
//!     session.execute(&Command::new("INSERT INTO note (body) VALUES ({})").arg("hi".to_string()))?;
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

mod access;
mod config;
pub(crate) mod connection;
mod session;

pub use access::{Datastore, TransactionContext};
pub use config::{default_data_dir, resolve_database_path, DatabaseConfig};
pub use session::{PreparedQuery, Session};

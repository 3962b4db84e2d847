//! Migration orchestration: the version catch-up loop.
//!
//! A [`Migrator`] brings one database to its configured target version
//! exactly once per instance, applying every pending script inside a single
//! transaction so a failed catch-up leaves no partial schema behind.

use std::sync::atomic::{AtomicBool, Ordering};

use rusqlite::TransactionBehavior;

use crate::database::{connection, DatabaseConfig, Session};
use crate::error::Result;

use super::batch::split_batches;
use super::probe::{VersionProbe, VersionView};
use super::source::ScriptSource;
use super::NOT_INSTALLED;

/// Fixed per-instance migration settings.
///
/// # Examples
///
/// ```
/// use catchup::MigrationConfig;
///
/// let config = MigrationConfig::new(3).with_version_view("app_version");
/// assert_eq!(config.target_version, 3);
/// ```
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// The version the database is brought to.
    pub target_version: u32,
    /// Whether version 0's script alone creates the entire schema.
    pub bootstrap_is_complete: bool,
    /// Name of the table or view reporting the applied version.
    pub version_view: String,
}

impl MigrationConfig {
    /// Creates a configuration targeting `target_version`.
    ///
    /// Defaults: `bootstrap_is_complete` off, version object named
    /// `schema_version`.
    #[must_use]
    pub fn new(target_version: u32) -> Self {
        Self {
            target_version,
            bootstrap_is_complete: false,
            version_view: "schema_version".into(),
        }
    }

    /// Declares that version 0's script creates the full schema from empty.
    ///
    /// With this set, a catch-up that starts from an empty database runs
    /// only script 0 and stops, no matter how many later version scripts
    /// exist. A database that is merely behind still applies every pending
    /// script. Note the consequence: a missing intermediate script goes
    /// unnoticed on fresh installs, surfacing only when an existing database
    /// needs it.
    #[must_use]
    pub fn bootstrap_complete(mut self) -> Self {
        self.bootstrap_is_complete = true;
        self
    }

    /// Sets the name of the version-reporting table or view.
    #[must_use]
    pub fn with_version_view(mut self, name: impl Into<String>) -> Self {
        self.version_view = name.into();
        self
    }
}

/// Brings a database schema to its target version, once per instance.
///
/// The migrator owns its done flag: after one fully successful catch-up,
/// every later [`ensure_migrated`](Migrator::ensure_migrated) call returns
/// without touching the database. The flag is never reset; a fresh instance
/// probes fresh.
///
/// Concurrent migration of the same database file from multiple instances or
/// processes is not coordinated here. Callers that deploy in parallel must
/// serialize the first migrating call themselves.
pub struct Migrator {
    config: MigrationConfig,
    scripts: Box<dyn ScriptSource>,
    probe: Box<dyn VersionProbe>,
    done: AtomicBool,
}

impl Migrator {
    /// Creates a migrator with the default [`VersionView`] probe.
    pub fn new(config: MigrationConfig, scripts: impl ScriptSource + 'static) -> Self {
        let probe = VersionView::new(config.version_view.clone());
        Self {
            config,
            scripts: Box::new(scripts),
            probe: Box::new(probe),
            done: AtomicBool::new(false),
        }
    }

    /// Substitutes a custom version probe.
    #[must_use]
    pub fn with_probe(mut self, probe: impl VersionProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Returns the migration settings this instance was built with.
    #[must_use]
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Probes the currently applied version on a fresh connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or the probe
    /// query fails.
    pub fn current_version(&self, database: &DatabaseConfig) -> Result<u32> {
        let conn = connection::open(database)?;
        self.probe.probe(&Session::new(&conn))
    }

    /// Ensures the database is at the target version.
    ///
    /// Idempotent and callable many times; the catch-up itself executes at
    /// most once per instance. A database already at or past the target is
    /// left untouched — no script is even loaded. On failure nothing is
    /// committed and the done flag stays unset, so the next call retries
    /// from a freshly probed version.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe fails, a script is missing, or any
    /// batch fails to execute. Script and batch failures abort the whole
    /// catch-up transaction.
    pub fn ensure_migrated(&self, database: &DatabaseConfig) -> Result<()> {
        if self.done.load(Ordering::Acquire) {
            return Ok(());
        }

        let current = self.current_version(database)?;
        if current < self.config.target_version {
            self.catch_up(database, current)?;
        }

        self.done.store(true, Ordering::Release);
        Ok(())
    }

    /// Applies every script from `from` up to the target version inside one
    /// transaction.
    fn catch_up(&self, database: &DatabaseConfig, from: u32) -> Result<()> {
        let mut conn = connection::open(database)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut version = from;
        while version < self.config.target_version {
            let script = self.scripts.load(version)?;
            let mut batches = 0usize;
            for batch in split_batches(&script) {
                tx.execute_batch(&batch)?;
                batches += 1;
            }
            log::debug!("applied migration script version={version} batches={batches}");

            if self.config.bootstrap_is_complete && version == NOT_INSTALLED {
                // The bootstrap script installed the whole schema; later
                // scripts have nothing left to do on this database.
                break;
            }
            version += 1;
        }

        tx.commit()?;
        log::info!(
            "database schema migrated from version {from} to {}",
            self.config.target_version
        );
        Ok(())
    }
}

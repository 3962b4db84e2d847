//! Loading datastore settings from configuration files.
//!
//! Applications that keep their database location and migration target in a
//! YAML file can deserialize a [`StoreSettings`] and convert it into the
//! runtime configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::database::DatabaseConfig;
use crate::error::Result;
use crate::migrate::MigrationConfig;

/// Complete settings for one datastore, as stored on disk.
///
/// # Examples
///
/// A minimal settings file:
///
/// ```yaml
/// database:
///   path: /var/lib/app/app.db
/// migration:
///   target_version: 3
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StoreSettings {
    /// Connection settings.
    pub database: DatabaseSettings,
    /// Migration settings.
    pub migration: MigrationSettings,
}

/// Connection settings as stored on disk.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSettings {
    /// Path to the database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: Option<u64>,
    /// Whether to create the database file if missing.
    pub auto_create: Option<bool>,
    /// Whether to open read-only.
    pub read_only: Option<bool>,
}

/// Migration settings as stored on disk.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MigrationSettings {
    /// The schema version the database is brought to.
    pub target_version: u32,
    /// Whether version 0's script creates the full schema from empty.
    pub bootstrap_is_complete: Option<bool>,
    /// Name of the version-reporting table or view.
    pub version_view: Option<String>,
}

impl StoreSettings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. Unknown fields
    /// are rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Loads settings from the file named by `CATCHUP_CONFIG`, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable names a file that cannot be read or
    /// parsed. An unset variable is `Ok(None)`.
    pub fn load_default() -> Result<Option<Self>> {
        match std::env::var("CATCHUP_CONFIG") {
            Ok(path) => Self::load(Path::new(&path)).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Builds the connection configuration these settings describe.
    #[must_use]
    pub fn database_config(&self) -> DatabaseConfig {
        let mut config = DatabaseConfig::new(&self.database.path);
        if let Some(ms) = self.database.busy_timeout_ms {
            config = config.with_busy_timeout(Duration::from_millis(ms));
        }
        if self.database.read_only == Some(true) {
            config = config.read_only();
        }
        if self.database.auto_create == Some(false) {
            config.auto_create = false;
        }
        config
    }

    /// Builds the migration configuration these settings describe.
    #[must_use]
    pub fn migration_config(&self) -> MigrationConfig {
        let mut config = MigrationConfig::new(self.migration.target_version);
        if self.migration.bootstrap_is_complete == Some(true) {
            config = config.bootstrap_complete();
        }
        if let Some(view) = &self.migration.version_view {
            config = config.with_version_view(view.clone());
        }
        config
    }
}

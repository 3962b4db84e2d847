//! Schema version probing.
//!
//! The database reports its applied version through a named table or view;
//! migration scripts own creating and replacing that object. Absence of the
//! object is the one recognized "not installed" signal.

use crate::command::Command;
use crate::database::Session;
use crate::error::{Error, Result};

use super::NOT_INSTALLED;

/// A way to read the schema's currently applied version.
pub trait VersionProbe: Send + Sync {
    /// Returns the applied version, or [`NOT_INSTALLED`] for an empty
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error only for connection or execution failure; "not
    /// installed" is a normal result, never an error.
    fn probe(&self, session: &Session<'_>) -> Result<u32>;
}

/// The default probe: a named table or view whose first column of its first
/// row is the applied version.
///
/// If no object with the configured name exists in `sqlite_master`, the
/// database counts as not installed and no further query runs. If the object
/// exists but holds no row, the reported version is 0.
pub struct VersionView {
    name: String,
}

impl VersionView {
    /// Creates a probe reading from the object named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl VersionProbe for VersionView {
    fn probe(&self, session: &Session<'_>) -> Result<u32> {
        let objects: Option<i64> = session.scalar(
            &Command::new("SELECT COUNT(*) FROM sqlite_master WHERE name = {}")
                .arg(self.name.clone()),
        )?;
        if objects.unwrap_or(0) == 0 {
            return Ok(NOT_INSTALLED);
        }

        // The name is a configured identifier, so it is quoted here rather
        // than bound: SQLite cannot parameterize identifiers.
        let quoted = self.name.replace('"', "\"\"");
        let version: Option<i64> =
            session.scalar(&Command::new(format!("SELECT * FROM \"{quoted}\" LIMIT 1")))?;
        match version {
            None => Ok(NOT_INSTALLED),
            Some(value) => u32::try_from(value).map_err(|_| Error::Validation {
                field: "schema_version".into(),
                message: format!("database reports negative version {value}"),
            }),
        }
    }
}

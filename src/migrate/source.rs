//! Where migration scripts come from.
//!
//! The orchestrator only needs "given version N, produce raw SQL text or
//! signal not-found"; packaging is the application's business. Two common
//! packagings ship here: a directory of numbered files and an ordered
//! in-memory set (for `include_str!` embedding and tests).

use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// A source of numbered migration scripts.
#[cfg_attr(test, mockall::automock)]
pub trait ScriptSource: Send + Sync {
    /// Loads the raw SQL text for one version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScriptNotFound`] if no script exists for `version`,
    /// or another error if the script cannot be read.
    fn load(&self, version: u32) -> Result<String>;
}

/// Migration scripts stored as numbered `.sql` files in one directory.
///
/// File names are the zero-padded version number plus `.sql`, with an
/// optional fixed prefix: `0000.sql`, `0001.sql`, … by default, or e.g.
/// `app_0001.sql` with `with_prefix("app_")`.
///
/// # Examples
///
/// ```
/// use catchup::ScriptDir;
///
/// let scripts = ScriptDir::new("migrations").with_prefix("app_");
/// ```
pub struct ScriptDir {
    dir: PathBuf,
    prefix: String,
    width: usize,
}

impl ScriptDir {
    /// Creates a source reading from `dir` with no prefix and pad width 4.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: String::new(),
            width: 4,
        }
    }

    /// Sets a fixed file-name prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the zero-pad width of the version number.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    fn script_path(&self, version: u32) -> PathBuf {
        self.dir
            .join(format!("{}{:0w$}.sql", self.prefix, version, w = self.width))
    }
}

impl ScriptSource for ScriptDir {
    fn load(&self, version: u32) -> Result<String> {
        match std::fs::read_to_string(self.script_path(version)) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(Error::ScriptNotFound { version })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Migration scripts held in memory, indexed by version.
///
/// # Examples
///
/// ```
/// use catchup::EmbeddedScripts;
///
/// let scripts = EmbeddedScripts::new([
///     "CREATE TABLE t (id INTEGER);\nGO\n",
///     "ALTER TABLE t ADD COLUMN name TEXT;\nGO\n",
/// ]);
/// ```
pub struct EmbeddedScripts {
    scripts: Vec<String>,
}

impl EmbeddedScripts {
    /// Creates a source from scripts ordered by version, starting at 0.
    pub fn new<I, S>(scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scripts: scripts.into_iter().map(Into::into).collect(),
        }
    }
}

impl ScriptSource for EmbeddedScripts {
    fn load(&self, version: u32) -> Result<String> {
        self.scripts
            .get(version as usize)
            .cloned()
            .ok_or(Error::ScriptNotFound { version })
    }
}

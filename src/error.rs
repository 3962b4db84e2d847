//! Error types for the catchup library.
//!
//! This module provides the error hierarchy for migration and database
//! access operations, using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Result type alias for operations that may fail with a catchup error.
///
/// # Examples
///
/// ```
/// use catchup::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(1)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the catchup library.
///
/// This enum encompasses all error conditions that can occur while
/// migrating a schema or executing commands against the database.
#[derive(Debug, Error)]
pub enum Error {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No migration script exists for a version the catch-up needs.
    #[error("no migration script for version {version}")]
    ScriptNotFound {
        /// The version whose script could not be found.
        version: u32,
    },

    /// A command template and its argument list disagree.
    #[error("command template has {holes} placeholder(s) but {values} value(s) were supplied")]
    ParameterMismatch {
        /// The number of `{}` holes in the template.
        holes: usize,
        /// The number of argument values supplied.
        values: usize,
    },

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An asynchronous database task was cancelled before it completed.
    #[error("database task cancelled before completion")]
    Cancelled,
}

impl Error {
    /// Check if the error indicates a missing migration script.
    ///
    /// # Examples
    ///
    /// ```
    /// use catchup::Error;
    ///
    /// let err = Error::ScriptNotFound { version: 3 };
    /// assert!(err.is_script_not_found());
    /// ```
    #[must_use]
    pub fn is_script_not_found(&self) -> bool {
        matches!(self, Self::ScriptNotFound { .. })
    }
}

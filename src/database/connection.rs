//! Connection opening and PRAGMA setup.
//!
//! Connections here are per-call: each public datastore operation opens a
//! fresh connection from the configuration and releases it on exit.

use rusqlite::{Connection, OpenFlags};

use crate::error::Result;

use super::config::DatabaseConfig;

/// Opens a connection with the configured flags and PRAGMA settings.
///
/// This function will:
/// - Create the parent directory if `auto_create` is enabled
/// - Open the database with appropriate flags
/// - Set WAL mode for concurrent access (writable connections only)
/// - Configure busy timeout
///
/// # Errors
///
/// Returns an error if the database file cannot be opened, the parent
/// directory cannot be created, or PRAGMA settings cannot be applied.
pub(crate) fn open(config: &DatabaseConfig) -> Result<Connection> {
    if config.auto_create && !config.path.exists() {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let flags = if config.read_only {
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
    } else if config.auto_create {
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
    } else {
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
    };

    let conn = Connection::open_with_flags(&config.path, flags)?;

    if !config.read_only {
        // PRAGMA journal_mode returns a result row, so query_row is required
        let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    }
    conn.execute_batch("PRAGMA synchronous = NORMAL")?;
    conn.execute_batch(&format!(
        "PRAGMA busy_timeout = {}",
        config.busy_timeout.as_millis()
    ))?;

    Ok(conn)
}

//! The bound execution handle passed to caller logic.
//!
//! A [`Session`] pairs caller-supplied logic with one open connection (and,
//! for transactional calls, the open transaction). It cannot be constructed
//! by callers and cannot outlive the call that lent it out.

use rusqlite::types::FromSql;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, Statement, ToSql};

use crate::command::Command;
use crate::error::{Error, Result};

/// An execution handle bound to one open connection.
///
/// When the enclosing call runs inside a transaction, every command issued
/// through the session participates in it; commit or rollback is decided by
/// the call that created the session, never here.
///
/// # Examples
///
/// ```no_run
/// use catchup::{Command, Datastore};
///
/// # fn demo(store: &Datastore) -> catchup::Result<()> {
/// let count: Option<i64> = store.query(|session| {
///     session.scalar(&Command::new("SELECT COUNT(*) FROM person"))
/// })?;
/// # Ok(())
/// # }
/// ```
pub struct Session<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Session<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Executes a command and returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails to render or execute.
    pub fn execute(&self, command: &Command) -> Result<usize> {
        let rendered = command.render()?;
        let mut stmt = self.conn.prepare(&rendered.sql)?;
        let params = rendered.param_refs();
        Ok(stmt.execute(params.as_slice())?)
    }

    /// Executes a command and returns the first cell of the first row.
    ///
    /// Returns `None` when the query produces no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails to render or execute, or if the
    /// first cell cannot convert to `T`.
    pub fn scalar<T: FromSql>(&self, command: &Command) -> Result<Option<T>> {
        let rendered = command.render()?;
        let mut stmt = self.conn.prepare(&rendered.sql)?;
        let params = rendered.param_refs();
        match stmt.query_row(params.as_slice(), |row| row.get(0)) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Prepares a command for row-at-a-time consumption.
    ///
    /// The returned [`PreparedQuery`] pulls rows lazily; see
    /// [`PreparedQuery::rows`]. Use [`Session::query`] when a materialized
    /// collection is wanted.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails to render or prepare.
    pub fn prepare(&self, command: &Command) -> Result<PreparedQuery<'conn>> {
        let rendered = command.render()?;
        let stmt = self.conn.prepare(&rendered.sql)?;
        Ok(PreparedQuery {
            stmt,
            params: rendered.params,
        })
    }

    /// Executes a query and collects the transformed rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails, or if `transform` fails on any
    /// row.
    pub fn query<T, F>(&self, command: &Command, transform: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut prepared = self.prepare(command)?;
        let results = prepared.rows(transform)?.collect();
        results
    }

    /// Returns the underlying connection for operations the command surface
    /// does not cover.
    #[must_use]
    pub const fn connection(&self) -> &'conn Connection {
        self.conn
    }
}

/// A prepared query whose rows are pulled lazily, one at a time.
///
/// The sequence is single-pass: once consumed it cannot be restarted, and it
/// borrows the statement for as long as iteration continues.
pub struct PreparedQuery<'conn> {
    stmt: Statement<'conn>,
    params: Vec<(String, Value)>,
}

impl PreparedQuery<'_> {
    /// Runs the query, applying `transform` to each row as it is pulled.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails to start; per-row failures are
    /// yielded through the iterator.
    pub fn rows<'a, T, F>(&'a mut self, transform: F) -> Result<impl Iterator<Item = Result<T>> + 'a>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T> + 'a,
    {
        let params: Vec<(&str, &dyn ToSql)> = self
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();
        let rows = self.stmt.query_map(params.as_slice(), transform)?;
        Ok(rows.map(|row| row.map_err(Error::from)))
    }
}

//! The public execution surface: migration-checked, scoped database calls.
//!
//! Every entry point first ensures the schema is at its target version (a
//! cheap flag check after the first success), then opens one connection,
//! hands a [`Session`] to the caller's logic, and releases everything on
//! every exit path.

use std::sync::Arc;

use rusqlite::TransactionBehavior;

use crate::error::{Error, Result};
use crate::migrate::Migrator;

use super::config::DatabaseConfig;
use super::connection;
use super::session::Session;

/// Per-call commit/rollback decision flag for transactional calls.
///
/// Created fresh for each transactional call and lent to the caller's logic;
/// the transaction commits unless a rollback was requested or the logic
/// failed.
///
/// # Examples
///
/// ```no_run
/// use catchup::{Command, Datastore};
///
/// # fn demo(store: &Datastore) -> catchup::Result<()> {
/// store.run_in_transaction(|session, context| {
///     session.execute(&Command::new("DELETE FROM person"))?;
///     context.request_rollback(); // changed my mind
///     Ok(())
/// })?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct TransactionContext {
    rollback_requested: bool,
}

impl TransactionContext {
    /// Requests that the enclosing transaction roll back instead of commit.
    pub fn request_rollback(&mut self) {
        self.rollback_requested = true;
    }

    /// Returns whether a rollback has been requested.
    #[must_use]
    pub const fn is_rollback_requested(&self) -> bool {
        self.rollback_requested
    }
}

/// The entry point for all database access.
///
/// A datastore pairs a [`DatabaseConfig`] with a [`Migrator`]; its first use
/// in a process brings the schema to the target version exactly once. Each
/// call opens its own connection, so a `Datastore` is cheap to clone and
/// share across threads.
///
/// # Examples
///
/// ```no_run
/// use catchup::{
///     Command, Datastore, DatabaseConfig, EmbeddedScripts, MigrationConfig, Migrator,
/// };
///
/// # fn demo() -> catchup::Result<()> {
/// let bootstrap = "CREATE TABLE person (email TEXT NOT NULL, full_name TEXT NOT NULL);\n\
///                  GO\n\
///                  CREATE VIEW schema_version AS SELECT 1 AS version;\n\
///                  GO\n";
/// let migrator = Migrator::new(MigrationConfig::new(1), EmbeddedScripts::new([bootstrap]));
/// let store = Datastore::new(DatabaseConfig::new("/tmp/app.db"), migrator);
///
/// store.run(|session| {
///     session.execute(
///         &Command::new("INSERT INTO person (email, full_name) VALUES ({}, {})")
///             .arg("bruce@example.com".to_string())
///             .arg("Bruce Wayne".to_string()),
///     )?;
///     Ok(())
/// })?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Datastore {
    inner: Arc<Inner>,
}

struct Inner {
    database: DatabaseConfig,
    migrator: Migrator,
}

impl Datastore {
    /// Creates a datastore over `database`, migrated by `migrator`.
    #[must_use]
    pub fn new(database: DatabaseConfig, migrator: Migrator) -> Self {
        Self {
            inner: Arc::new(Inner { database, migrator }),
        }
    }

    /// Ensures the schema is at the target version.
    ///
    /// Every other entry point calls this first; it is public so deployment
    /// code can migrate eagerly instead of on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if migration fails; see
    /// [`Migrator::ensure_migrated`].
    pub fn ensure_migrated(&self) -> Result<()> {
        self.inner.migrator.ensure_migrated(&self.inner.database)
    }

    /// Probes the currently applied schema version on a fresh connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or the probe
    /// query fails.
    pub fn current_version(&self) -> Result<u32> {
        self.inner.migrator.current_version(&self.inner.database)
    }

    /// Runs caller logic against an open connection, without a transaction.
    ///
    /// # Errors
    ///
    /// Returns migration or connection errors, or whatever `action` returns;
    /// the connection is released first in every case.
    pub fn run<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce(&Session<'_>) -> Result<()>,
    {
        self.query(action)
    }

    /// Runs caller logic and returns its value, without a transaction.
    ///
    /// # Errors
    ///
    /// Returns migration or connection errors, or whatever `action` returns;
    /// the connection is released first in every case.
    pub fn query<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce(&Session<'_>) -> Result<T>,
    {
        self.ensure_migrated()?;
        let conn = connection::open(&self.inner.database)?;
        action(&Session::new(&conn))
    }

    /// Runs caller logic inside a transaction.
    ///
    /// The transaction commits unless the logic requested a rollback or
    /// returned an error.
    ///
    /// # Errors
    ///
    /// Returns migration, connection, or commit/rollback errors, or whatever
    /// `action` returns. A failure from `action` always rolls back.
    pub fn run_in_transaction<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce(&Session<'_>, &mut TransactionContext) -> Result<()>,
    {
        self.query_in_transaction(action)
    }

    /// Runs caller logic inside a transaction and returns its value.
    ///
    /// The returned value is the only state that survives the call; the
    /// connection and transaction are released before it is handed back.
    ///
    /// # Errors
    ///
    /// Returns migration, connection, or commit/rollback errors, or whatever
    /// `action` returns. A failure from `action` always rolls back.
    pub fn query_in_transaction<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce(&Session<'_>, &mut TransactionContext) -> Result<T>,
    {
        self.ensure_migrated()?;
        let mut conn = connection::open(&self.inner.database)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut context = TransactionContext::default();

        match action(&Session::new(&tx), &mut context) {
            Ok(value) => {
                if context.is_rollback_requested() {
                    log::debug!("transaction rolled back at caller request");
                    tx.rollback()?;
                } else {
                    tx.commit()?;
                }
                Ok(value)
            }
            Err(err) => {
                // Failure must never commit, even if this rollback fails too.
                if let Err(rollback_err) = tx.rollback() {
                    log::warn!("rollback after failed caller logic also failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }

    /// Like [`run`](Datastore::run), executed on the blocking thread pool.
    ///
    /// Must be called from within a Tokio runtime. The caller's logic itself
    /// is blocking code; the await on this future is the suspension point.
    ///
    /// # Errors
    ///
    /// As [`run`](Datastore::run), plus [`Error::Cancelled`] if the blocking
    /// task is cancelled. A panic in `action` resumes on the caller.
    pub async fn run_async<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce(&Session<'_>) -> Result<()> + Send + 'static,
    {
        let store = self.clone();
        run_blocking(move || store.run(action)).await
    }

    /// Like [`query`](Datastore::query), executed on the blocking thread
    /// pool.
    ///
    /// The rows a query produces must be materialized before this future
    /// resolves; row-at-a-time pulling does not cross the pool boundary, so
    /// compose with [`Session::query`] rather than [`Session::prepare`].
    ///
    /// # Errors
    ///
    /// As [`query`](Datastore::query), plus [`Error::Cancelled`] if the
    /// blocking task is cancelled.
    pub async fn query_async<T, F>(&self, action: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Session<'_>) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        run_blocking(move || store.query(action)).await
    }

    /// Like [`run_in_transaction`](Datastore::run_in_transaction), executed
    /// on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// As [`run_in_transaction`](Datastore::run_in_transaction), plus
    /// [`Error::Cancelled`] if the blocking task is cancelled.
    pub async fn run_in_transaction_async<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce(&Session<'_>, &mut TransactionContext) -> Result<()> + Send + 'static,
    {
        let store = self.clone();
        run_blocking(move || store.run_in_transaction(action)).await
    }

    /// Like [`query_in_transaction`](Datastore::query_in_transaction),
    /// executed on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// As [`query_in_transaction`](Datastore::query_in_transaction), plus
    /// [`Error::Cancelled`] if the blocking task is cancelled.
    pub async fn query_in_transaction_async<T, F>(&self, action: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Session<'_>, &mut TransactionContext) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        run_blocking(move || store.query_in_transaction(action)).await
    }
}

/// Runs one blocking datastore call on Tokio's blocking pool.
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(outcome) => outcome,
        Err(join_err) if join_err.is_panic() => std::panic::resume_unwind(join_err.into_panic()),
        Err(_) => Err(Error::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::migrate::{EmbeddedScripts, MigrationConfig};
    use tempfile::{tempdir, TempDir};

    const BOOTSTRAP: &str = "\
CREATE TABLE person (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL,
    full_name TEXT NOT NULL,
    favorite_color TEXT
);
GO
CREATE VIEW schema_version AS SELECT 1 AS version;
GO
";

    fn test_store() -> (TempDir, Datastore) {
        let dir = tempdir().unwrap();
        let database = DatabaseConfig::new(dir.path().join("test.db"));
        let migrator = Migrator::new(MigrationConfig::new(1), EmbeddedScripts::new([BOOTSTRAP]));
        (dir, Datastore::new(database, migrator))
    }

    fn person_count(store: &Datastore) -> i64 {
        store
            .query(|session| {
                Ok(session
                    .scalar::<i64>(&Command::new("SELECT COUNT(*) FROM person"))?
                    .unwrap_or(0))
            })
            .unwrap()
    }

    fn insert_person(session: &Session<'_>, email: &str) -> Result<usize> {
        session.execute(
            &Command::new("INSERT INTO person (email, full_name) VALUES ({}, {})")
                .arg(email.to_string())
                .arg("Test Person".to_string()),
        )
    }

    #[test]
    fn test_first_call_migrates() {
        let (_dir, store) = test_store();
        store.run(|_session| Ok(())).unwrap();
        assert_eq!(store.current_version().unwrap(), 1);
    }

    #[test]
    fn test_query_returns_closure_value() {
        let (_dir, store) = test_store();
        let version: Option<i64> = store
            .query(|session| session.scalar(&Command::new("SELECT version FROM schema_version")))
            .unwrap();
        assert_eq!(version, Some(1));
    }

    #[test]
    fn test_transaction_commits_by_default() {
        let (_dir, store) = test_store();
        store
            .run_in_transaction(|session, _context| {
                insert_person(session, "a@example.com")?;
                Ok(())
            })
            .unwrap();
        assert_eq!(person_count(&store), 1);
    }

    #[test]
    fn test_requested_rollback_discards_changes() {
        let (_dir, store) = test_store();
        store
            .run_in_transaction(|session, context| {
                insert_person(session, "a@example.com")?;
                context.request_rollback();
                Ok(())
            })
            .unwrap();
        assert_eq!(person_count(&store), 0);
    }

    #[test]
    fn test_caller_error_rolls_back_and_propagates() {
        let (_dir, store) = test_store();
        let result = store.run_in_transaction(|session, _context| {
            insert_person(session, "a@example.com")?;
            Err(Error::Validation {
                field: "email".into(),
                message: "rejected".into(),
            })
        });

        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(person_count(&store), 0);
    }

    #[test]
    fn test_query_in_transaction_returns_value() {
        let (_dir, store) = test_store();
        let affected = store
            .query_in_transaction(|session, _context| insert_person(session, "a@example.com"))
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(person_count(&store), 1);
    }

    #[test]
    fn test_clones_share_one_migration() {
        let (_dir, store) = test_store();
        let clone = store.clone();

        store.run(|_session| Ok(())).unwrap();
        clone.run(|_session| Ok(())).unwrap();
        assert_eq!(store.current_version().unwrap(), 1);
    }
}

//! Common test utilities for integration tests.
//!
//! This module provides the migration scripts and fixture helpers shared by
//! the integration suites: a small person schema, seed data, and a script
//! source that counts loads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use catchup::{
    Command, Datastore, DatabaseConfig, EmbeddedScripts, MigrationConfig, Migrator, Result,
    ScriptSource,
};
use tempfile::TempDir;

/// Version 0: creates the person table and the version view reporting 1.
#[allow(dead_code)]
pub const BOOTSTRAP: &str = "\
CREATE TABLE person (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    favorite_color TEXT
);
GO

CREATE INDEX idx_person_email ON person(email);
GO

CREATE VIEW schema_version AS SELECT 1 AS version;
GO
";

/// Version 1: seeds four people and bumps the reported version to 2.
///
/// Three fictional characters have no favorite color. Batman does, of
/// course.
#[allow(dead_code)]
pub const SEED_PEOPLE: &str = "\
INSERT INTO person (email, full_name, favorite_color)
VALUES ('batman@example.com', 'Bruce Wayne', 'black');
GO

INSERT INTO person (email, full_name) VALUES ('sherlock@example.com', 'Sherlock Holmes');
INSERT INTO person (email, full_name) VALUES ('lizzy@example.com', 'Elizabeth Bennet');
INSERT INTO person (email, full_name) VALUES ('ishmael@example.com', 'Ishmael');
GO

DROP VIEW schema_version;
GO

CREATE VIEW schema_version AS SELECT 2 AS version;
GO
";

/// A record shape matching the person table.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub favorite_color: Option<String>,
}

#[allow(dead_code)]
impl PersonRecord {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            full_name: row.get(2)?,
            favorite_color: row.get(3)?,
        })
    }
}

/// Builds a datastore over `dir` targeting `target_version` with the
/// standard scripts.
#[allow(dead_code)]
pub fn store_at(dir: &TempDir, target_version: u32) -> Datastore {
    let database = DatabaseConfig::new(dir.path().join("test.db"));
    let migrator = Migrator::new(
        MigrationConfig::new(target_version),
        EmbeddedScripts::new([BOOTSTRAP, SEED_PEOPLE]),
    );
    Datastore::new(database, migrator)
}

/// A script source wrapper that counts how many loads happen.
#[allow(dead_code)]
pub struct CountingScripts {
    inner: EmbeddedScripts,
    loads: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingScripts {
    pub fn new<I, S>(scripts: I) -> (Self, Arc<AtomicUsize>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let loads = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: EmbeddedScripts::new(scripts),
                loads: Arc::clone(&loads),
            },
            loads,
        )
    }
}

impl ScriptSource for CountingScripts {
    fn load(&self, version: u32) -> Result<String> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(version)
    }
}

/// Counts people with and without a favorite color.
#[allow(dead_code)]
pub fn favorite_color_counts(store: &Datastore) -> (i64, i64) {
    store
        .query(|session| {
            let with_color: Option<i64> = session.scalar(&Command::new(
                "SELECT COUNT(*) FROM person WHERE favorite_color IS NOT NULL",
            ))?;
            let without_color: Option<i64> = session.scalar(&Command::new(
                "SELECT COUNT(*) FROM person WHERE favorite_color IS NULL",
            ))?;
            Ok((with_color.unwrap_or(0), without_color.unwrap_or(0)))
        })
        .unwrap()
}

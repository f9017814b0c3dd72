//! Storage layer for accessmap.
//!
//! This module provides `SQLite`-based persistent storage for the facility
//! datasets, user accounts and sessions, and the crowd-sourced records
//! (notes, photos, lift status reports, saved locations, route history).
//! Queries are grouped by entity in the submodules; each adds methods to
//! [`Storage`].

mod facilities;
pub mod migrations;
mod notes;
mod personal;
pub mod schema;
mod status;
mod users;
mod values;

#[cfg(test)]
pub(crate) use facilities::fixtures;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, Params, Row, Transaction};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Tables reported by [`Storage::stats`].
const COUNTED_TABLES: &[&str] = &[
    "users",
    "sessions",
    "lifts",
    "footbridges",
    "zebra_crossings",
    "pedestrian_nodes",
    "pedestrian_links",
    "destinations",
    "saved_locations",
    "route_history",
    "accessibility_notes",
    "note_photos",
    "lift_status_reports",
];

/// Storage engine for accessmap.
///
/// Wraps a single `SQLite` connection. Callers that share a `Storage`
/// between threads put it behind a mutex.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a transaction on the underlying connection.
    ///
    /// Every `Storage` method called while the returned guard is alive
    /// runs inside the transaction. Dropping the guard rolls back.
    ///
    /// # Errors
    ///
    /// Returns an error if a transaction is already open.
    pub fn begin(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Count the rows of one table.
    ///
    /// # Errors
    ///
    /// Returns an error if `table` is not a known table or the query fails.
    pub fn count(&self, table: &str) -> Result<i64> {
        if !COUNTED_TABLES.contains(&table) {
            return Err(Error::internal(format!("unknown table {table}")));
        }
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let mut row_counts = BTreeMap::new();
        for table in COUNTED_TABLES {
            row_counts.insert((*table).to_string(), self.count(table)?);
        }

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            path: self.path.clone(),
            row_counts,
            db_size_bytes,
        })
    }

    /// Run a query and collect every mapped row.
    fn query_rows<T, P: Params>(
        &self,
        sql: &str,
        params: P,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    /// Location of the database.
    pub path: PathBuf,
    /// Row count per table.
    pub row_counts: BTreeMap<String, i64>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

impl StorageStats {
    /// Row count of one table, zero when unknown.
    #[must_use]
    pub fn rows(&self, table: &str) -> i64 {
        self.row_counts.get(table).copied().unwrap_or(0)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Storage;
    use crate::model::{User, UserUpsert};

    pub(crate) fn storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    pub(crate) fn user(storage: &Storage, open_id: &str) -> User {
        storage
            .upsert_user(
                &UserUpsert {
                    open_id: open_id.to_string(),
                    name: Some(format!("{open_id} name")),
                    ..UserUpsert::default()
                },
                None,
            )
            .expect("failed to create test user")
    }
}

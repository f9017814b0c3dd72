//! Schema versioning.
//!
//! The version lives in the `metadata` table. Each migration runs in its
//! own transaction together with the version bump, so an interrupted
//! upgrade leaves the database at the last completed version.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{CREATE_INDEXES, CREATE_METADATA_TABLE, SCHEMA_STATEMENTS};

/// Metadata key holding the schema version.
const VERSION_KEY: &str = "schema_version";

type Migration = fn(&Connection) -> Result<()>;

/// Ordered migrations; entry `n` upgrades a database to version `n + 1`.
const MIGRATIONS: &[(&str, Migration)] = &[
    ("facility, user and crowd-sourced tables", create_tables),
    ("lookup indexes", create_indexes),
];

/// The schema version this build writes.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const CURRENT_VERSION: i32 = MIGRATIONS.len() as i32;

/// Bring a database up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if the database was written by a newer build, holds an
/// unreadable version, or a migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for (index, (name, migrate)) in MIGRATIONS.iter().enumerate().skip(version_index(version)) {
        info!("Applying schema migration v{}: {}", index + 1, name);

        let tx = conn.unchecked_transaction()?;
        migrate(&tx)?;
        set_schema_version(&tx, index + 1)?;
        tx.commit()?;
    }

    debug!("Schema at version {}", CURRENT_VERSION);
    Ok(())
}

/// Stored schema version, 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value.map_or(Ok(0), |value| {
        value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        })
    })
}

fn set_schema_version(conn: &Connection, version: usize) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

fn version_index(version: i32) -> usize {
    usize::try_from(version).unwrap_or(0)
}

fn create_tables(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}

fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_INDEXES)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    fn names(conn: &Connection, kind: &str) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = ?1 ORDER BY name")
            .unwrap()
            .query_map([kind], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_fresh_database_gets_every_table() {
        let conn = fresh();
        initialize_schema(&conn).unwrap();

        let tables = names(&conn, "table");
        for table in [
            "users",
            "sessions",
            "lifts",
            "footbridges",
            "zebra_crossings",
            "pedestrian_nodes",
            "pedestrian_links",
            "saved_locations",
            "route_history",
            "accessibility_notes",
            "note_photos",
            "lift_status_reports",
            "destinations",
            "metadata",
        ] {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_indexes_come_from_second_migration() {
        let conn = fresh();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();
        create_tables(&conn).unwrap();
        set_schema_version(&conn, 1).unwrap();
        assert!(!names(&conn, "index")
            .iter()
            .any(|n| n == "idx_route_history_user"));

        initialize_schema(&conn).unwrap();
        let indexes = names(&conn, "index");
        assert!(indexes.iter().any(|n| n == "idx_route_history_user"));
        assert!(indexes.iter().any(|n| n == "idx_lift_status_lift"));
        assert!(indexes.iter().any(|n| n == "idx_notes_facility"));
        assert_eq!(schema_version(&conn).unwrap(), 2);
    }

    #[test]
    fn test_reinitializing_is_a_no_op() {
        let conn = fresh();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO destinations (name, name_zh, category, latitude, longitude, \
             accessibility_rating, created_at) \
             VALUES ('Ocean Park', '海洋公園', 'Entertainment', 22.2467, 114.1757, 4, '2026-01-01T00:00:00.000000Z')",
            [],
        )
        .unwrap();

        initialize_schema(&conn).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM destinations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_unversioned_metadata_reads_as_zero() {
        let conn = fresh();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = fresh();
        initialize_schema(&conn).unwrap();
        set_schema_version(&conn, MIGRATIONS.len() + 1).unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_garbage_version_is_rejected() {
        let conn = fresh();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "UPDATE metadata SET value = 'v1' WHERE key = ?1",
            [VERSION_KEY],
        )
        .unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("invalid schema version"));
    }
}

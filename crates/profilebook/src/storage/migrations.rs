//! Schema versioning for the profile store.
//!
//! The version lives in the `metadata` table. Opening a store creates any
//! missing tables and then applies every migration newer than the recorded
//! version, in order.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

type Migration = fn(&Connection) -> Result<()>;

/// Migrations keyed by the version they produce.
const MIGRATIONS: &[(i32, Migration)] = &[(1, migrate_v1)];

fn migration_error(err: rusqlite::Error) -> Error {
    Error::StoreMigration {
        message: err.to_string(),
    }
}

/// Create the schema and bring it up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if schema creation or a migration fails, or if the
/// recorded version is newer than this build understands.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, []).map_err(migration_error)?;
    }

    let version = get_schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::StoreMigration {
            message: format!(
                "store schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for (target, migrate) in MIGRATIONS {
        if *target > version {
            tracing::debug!(version = target, "Applying store migration");
            migrate(conn)?;
            set_schema_version(conn, *target)?;
        }
    }

    Ok(())
}

/// Get the recorded schema version, or 0 for a fresh store.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()
        .map_err(migration_error)?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::StoreMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )
    .map_err(migration_error)?;
    Ok(())
}

/// Version 1 is the base schema from `SCHEMA_STATEMENTS`.
fn migrate_v1(_conn: &Connection) -> Result<()> {
    Ok(())
}

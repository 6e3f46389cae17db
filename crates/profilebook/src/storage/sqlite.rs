//! `SQLite`-backed profile store.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{migrations, new_document_id, next_update_stamp, now_millis, ProfileStore};
use crate::error::{Error, Result};
use crate::profile::{Profile, ProfileFields, ProfilePatch};

/// Durable profile store.
///
/// Each profile is stored as a JSON document keyed by its identifier. The
/// connection is shared behind a mutex and every query runs on tokio's
/// blocking pool, so the async API never stalls the executor.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a profile store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
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

        debug!("Opening profile store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::StoreOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|source| Error::StoreOpen {
                path: path.clone(),
                source,
            })?;

        migrations::initialize_schema(&conn)?;

        info!("Profile store opened at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the store at `path` only if its database file already exists.
    ///
    /// Returns `Ok(None)` without touching the filesystem when it doesn't.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing database cannot be opened.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No profile store at {}", path.display());
            return Ok(None);
        }
        Self::open(path).map(Some)
    }

    /// Create an in-memory store, mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| Error::StoreOpen {
            path: path.clone(),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| Error::internal("profile store connection lock poisoned"))?;
            f(&*guard)
        })
        .await
        .map_err(|e| Error::internal(format!("profile store task failed: {e}")))?
    }

    /// Convert a database row to a Profile.
    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        let id: String = row.get(0)?;
        let created_at: i64 = row.get(1)?;
        let updated_at: i64 = row.get(2)?;
        let document: String = row.get(3)?;

        let fields: ProfileFields = serde_json::from_str(&document)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        Ok(Profile {
            id,
            fields,
            created_at,
            updated_at,
        })
    }
}

#[async_trait::async_trait]
impl ProfileStore for SqliteStore {
    async fn create(&self, fields: &ProfileFields) -> Result<String> {
        let document =
            serde_json::to_string(fields).map_err(|e| Error::store_write("create", e))?;

        self.with_conn(move |conn| {
            let id = new_document_id();
            let now = now_millis();
            conn.execute(
                r"
                INSERT INTO profiles (id, created_at, updated_at, document)
                VALUES (?1, ?2, ?2, ?3)
                ",
                params![id, now, document],
            )
            .map_err(|e| Error::store_write("create", e))?;

            debug!(id = %id, "Created profile");
            Ok(id)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Profile>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    r"
                    SELECT id, created_at, updated_at, document
                    FROM profiles ORDER BY created_at DESC, rowid DESC
                    ",
                )
                .map_err(|e| Error::store_read("list_all", e))?;

            let profiles = stmt
                .query_map([], Self::row_to_profile)
                .map_err(|e| Error::store_read("list_all", e))?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::store_read("list_all", e))?;

            debug!(count = profiles.len(), "Listed profiles");
            Ok(profiles)
        })
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Profile>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                r"
                SELECT id, created_at, updated_at, document
                FROM profiles WHERE id = ?1
                ",
                [&id],
                Self::row_to_profile,
            )
            .optional()
            .map_err(|e| Error::store_read("get_by_id", e))
        })
        .await
    }

    async fn update(&self, id: &str, patch: &ProfilePatch) -> Result<()> {
        let id = id.to_string();
        let patch = patch.clone();
        self.with_conn(move |conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| Error::store_write("update", e))?;

            let existing: Option<(i64, String)> = tx
                .query_row(
                    "SELECT updated_at, document FROM profiles WHERE id = ?1",
                    [&id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|e| Error::store_write("update", e))?;

            let Some((previous, document)) = existing else {
                return Err(Error::store_write(
                    "update",
                    format!("no profile with id {id}"),
                ));
            };

            let mut fields: ProfileFields =
                serde_json::from_str(&document).map_err(|e| Error::store_write("update", e))?;
            fields.apply(&patch);
            let document =
                serde_json::to_string(&fields).map_err(|e| Error::store_write("update", e))?;
            let updated_at = next_update_stamp(previous);

            tx.execute(
                "UPDATE profiles SET document = ?1, updated_at = ?2 WHERE id = ?3",
                params![document, updated_at, id],
            )
            .map_err(|e| Error::store_write("update", e))?;
            tx.commit().map_err(|e| Error::store_write("update", e))?;

            debug!(id = %id, fields = patch.len(), "Updated profile");
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let affected = conn
                .execute("DELETE FROM profiles WHERE id = ?1", [&id])
                .map_err(|e| Error::store_write("delete", e))?;

            if affected > 0 {
                info!(id = %id, "Deleted profile");
            } else {
                debug!(id = %id, "Delete found no profile");
            }
            Ok(affected > 0)
        })
        .await
    }

    async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))
                .map_err(|e| Error::store_read("count", e))?;
            usize::try_from(count).map_err(|e| Error::store_read("count", e))
        })
        .await
    }
}

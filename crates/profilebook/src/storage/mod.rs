//! Storage layer for profilebook.
//!
//! This module defines the [`ProfileStore`] contract for the profile document
//! collection and its two implementations: a durable `SQLite`-backed store and
//! an in-memory store.

pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::profile::{Profile, ProfileFields, ProfilePatch};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Length of a store-assigned profile identifier.
pub const ID_LENGTH: usize = 20;

/// A collection of profile documents keyed by a store-assigned identifier.
///
/// Every call is independent: there is no transaction spanning calls and no
/// concurrency token, so two writers updating the same profile resolve as
/// last-write-wins.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert a new profile and return its assigned identifier.
    ///
    /// `createdAt` and `updatedAt` are both set to the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreWrite`](crate::Error::StoreWrite) if the write fails.
    async fn create(&self, fields: &ProfileFields) -> Result<String>;

    /// Get every profile, newest first by `createdAt`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreRead`](crate::Error::StoreRead) if the read fails.
    async fn list_all(&self) -> Result<Vec<Profile>>;

    /// Get a profile by its identifier.
    ///
    /// A missing profile is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreRead`](crate::Error::StoreRead) if the read fails.
    async fn get_by_id(&self, id: &str) -> Result<Option<Profile>>;

    /// Merge the fields carried by `patch` onto an existing profile.
    ///
    /// Fields absent from the patch are left untouched. `updatedAt` always
    /// moves forward, even for an empty patch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreWrite`](crate::Error::StoreWrite) if the profile
    /// does not exist or the write fails.
    async fn update(&self, id: &str, patch: &ProfilePatch) -> Result<()>;

    /// Permanently remove a profile.
    ///
    /// Returns `true` if a profile was deleted, `false` if it was already gone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreWrite`](crate::Error::StoreWrite) if the write fails.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Count stored profiles.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreRead`](crate::Error::StoreRead) if the read fails.
    async fn count(&self) -> Result<usize>;
}

/// Current time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// The `updatedAt` value for a write following one stamped `previous`.
///
/// Strictly greater than `previous` even when the clock has not advanced.
#[must_use]
pub fn next_update_stamp(previous: i64) -> i64 {
    now_millis().max(previous.saturating_add(1))
}

/// Generate a fresh opaque profile identifier.
#[must_use]
pub fn new_document_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LENGTH);
    id
}

//! In-memory profile store.
//!
//! Holds profiles in a map for the life of the process. Used by tests and
//! anywhere a throwaway collection is enough.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use super::{new_document_id, next_update_stamp, now_millis, ProfileStore};
use crate::error::{Error, Result};
use crate::profile::{Profile, ProfileFields, ProfilePatch};

#[derive(Debug, Default)]
struct State {
    /// Profiles with their insertion sequence number.
    profiles: HashMap<String, (u64, Profile)>,
    next_seq: u64,
}

/// A profile store that lives in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryStore {
    async fn create(&self, fields: &ProfileFields) -> Result<String> {
        let mut state = self.state.write().await;
        let id = new_document_id();
        let now = now_millis();
        let seq = state.next_seq;
        state.next_seq += 1;

        let profile = Profile {
            id: id.clone(),
            fields: fields.clone(),
            created_at: now,
            updated_at: now,
        };
        state.profiles.insert(id.clone(), (seq, profile));

        debug!(id = %id, "Created profile");
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Profile>> {
        let state = self.state.read().await;
        let mut entries: Vec<_> = state.profiles.values().collect();
        entries.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        Ok(entries.into_iter().map(|(_, p)| p.clone()).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state.profiles.get(id).map(|(_, p)| p.clone()))
    }

    async fn update(&self, id: &str, patch: &ProfilePatch) -> Result<()> {
        let mut state = self.state.write().await;
        let Some((_, profile)) = state.profiles.get_mut(id) else {
            return Err(Error::store_write("update", format!("no profile with id {id}")));
        };

        profile.fields.apply(patch);
        profile.updated_at = next_update_stamp(profile.updated_at);

        debug!(id = %id, fields = patch.len(), "Updated profile");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.profiles.remove(id).is_some())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.profiles.len())
    }
}

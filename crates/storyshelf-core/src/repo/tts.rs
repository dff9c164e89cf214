use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::CacheResult;
use crate::keys::{self, Collection, ProfileId};
use crate::models::TtsSnapshot;
use crate::store::{self, RecordStore};

use super::remove_keys;

/// Generated-audio snapshots, one nested map per (profile, story) under
/// `profile_{id}/story_tts_{storyId}`.
///
/// `save` always replaces the whole snapshot. Callers that want to add one
/// voice must load, modify and save the full map themselves.
#[derive(Clone)]
pub struct TtsRepository {
    store: Arc<dyn RecordStore>,
}

impl TtsRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn key(profile: ProfileId, story_id: i64) -> String {
        keys::collection_key(profile, Collection::StoryTts(story_id))
    }

    /// Audio snapshot of a story. Read errors yield an empty snapshot.
    pub async fn load(&self, profile: ProfileId, story_id: i64) -> TtsSnapshot {
        let key = Self::key(profile, story_id);
        match store::get_json::<TtsSnapshot>(self.store.as_ref(), &key).await {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(e) => {
                warn!(profile = %profile, story_id, error = %e, "Failed to load TTS snapshot");
                TtsSnapshot::default()
            }
        }
    }

    pub async fn save(&self, profile: ProfileId, story_id: i64, snapshot: &TtsSnapshot) -> CacheResult<()> {
        store::set_json(self.store.as_ref(), &Self::key(profile, story_id), snapshot).await?;
        debug!(profile = %profile, story_id, voices = snapshot.0.len(), "TTS snapshot saved");
        Ok(())
    }

    pub async fn remove(&self, profile: ProfileId, story_id: i64) -> CacheResult<()> {
        self.store.remove(&Self::key(profile, story_id)).await?;
        debug!(profile = %profile, story_id, "TTS snapshot removed");
        Ok(())
    }

    /// Remove every TTS snapshot of the profile. Returns how many keys were
    /// removed.
    pub async fn remove_all(&self, profile: ProfileId) -> CacheResult<usize> {
        let keys = store::keys_with_prefix(self.store.as_ref(), &keys::tts_prefix(profile)).await?;
        let removed = remove_keys(self.store.as_ref(), &keys).await?;
        debug!(profile = %profile, removed, "All TTS snapshots removed");
        Ok(removed)
    }
}

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::CacheResult;
use crate::keys::{self, Collection, ProfileId};
use crate::models::StorySection;
use crate::store::{self, RecordStore};

use super::remove_keys;

/// Section snapshots, one array per (profile, story) under
/// `profile_{id}/story_sections_{storyId}`.
#[derive(Clone)]
pub struct SectionRepository {
    store: Arc<dyn RecordStore>,
}

impl SectionRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn key(profile: ProfileId, story_id: i64) -> String {
        keys::collection_key(profile, Collection::StorySections(story_id))
    }

    /// Sections of a story in reading order. Read errors yield an empty list.
    pub async fn load(&self, profile: ProfileId, story_id: i64) -> Vec<StorySection> {
        let key = Self::key(profile, story_id);
        match store::get_json::<Vec<StorySection>>(self.store.as_ref(), &key).await {
            Ok(Some(mut sections)) => {
                sections.sort_by_key(|s| s.order_index);
                sections
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(profile = %profile, story_id, error = %e, "Failed to load story sections");
                Vec::new()
            }
        }
    }

    /// Replace every cached section of the story.
    pub async fn save(&self, profile: ProfileId, story_id: i64, sections: &[StorySection]) -> CacheResult<()> {
        for section in sections.iter().filter(|s| s.story_id != story_id) {
            warn!(
                profile = %profile,
                story_id,
                section_id = section.section_id,
                section_story_id = section.story_id,
                "Section saved under a different story"
            );
        }
        store::set_json(self.store.as_ref(), &Self::key(profile, story_id), sections).await?;
        debug!(profile = %profile, story_id, count = sections.len(), "Story sections saved");
        Ok(())
    }

    pub async fn remove(&self, profile: ProfileId, story_id: i64) -> CacheResult<()> {
        self.store.remove(&Self::key(profile, story_id)).await?;
        debug!(profile = %profile, story_id, "Story sections removed");
        Ok(())
    }

    /// Remove every section snapshot of the profile. Returns how many keys
    /// were removed.
    pub async fn remove_all(&self, profile: ProfileId) -> CacheResult<usize> {
        let keys = store::keys_with_prefix(self.store.as_ref(), &keys::sections_prefix(profile)).await?;
        let removed = remove_keys(self.store.as_ref(), &keys).await?;
        debug!(profile = %profile, removed, "All story sections removed");
        Ok(removed)
    }
}

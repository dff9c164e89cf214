use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheMeta, KeyLocks};
use crate::error::CacheResult;
use crate::keys::{self, Collection, ProfileId};
use crate::models::{RemoteStory, Story};
use crate::store::{self, RecordStore};

use super::{SectionRepository, TtsRepository};

/// Result of `StoryRepository::upsert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Updated,
}

/// Which preference flag a toggle flips.
#[derive(Debug, Clone, Copy)]
enum Preference {
    Bookmark,
    Like,
}

/// Story collection of a profile, stored as one array under
/// `profile_{id}/stories`.
#[derive(Clone)]
pub struct StoryRepository {
    store: Arc<dyn RecordStore>,
    locks: Arc<KeyLocks>,
    meta: CacheMeta,
    sections: SectionRepository,
    tts: TtsRepository,
}

impl StoryRepository {
    pub fn new(
        store: Arc<dyn RecordStore>,
        locks: Arc<KeyLocks>,
        meta: CacheMeta,
        sections: SectionRepository,
        tts: TtsRepository,
    ) -> Self {
        Self {
            store,
            locks,
            meta,
            sections,
            tts,
        }
    }

    fn key(profile: ProfileId) -> String {
        keys::collection_key(profile, Collection::Stories)
    }

    /// Log records whose owner disagrees with the namespace they live in.
    fn check_owners(profile: ProfileId, stories: &[Story]) {
        for story in stories.iter().filter(|s| !s.belongs_to(profile)) {
            warn!(
                profile = %profile,
                story_id = story.story_id,
                child_id = story.child_id,
                "Story owner does not match profile namespace"
            );
        }
    }

    /// Strict read used by write paths: a corrupt collection is an error,
    /// not an empty list that would then be written back.
    pub(crate) async fn read_stories(&self, profile: ProfileId) -> CacheResult<Vec<Story>> {
        let stories: Vec<Story> = store::get_json(self.store.as_ref(), &Self::key(profile))
            .await?
            .unwrap_or_default();
        Ok(stories)
    }

    async fn write_stories(&self, profile: ProfileId, stories: &[Story]) -> CacheResult<()> {
        Self::check_owners(profile, stories);
        store::set_json(self.store.as_ref(), &Self::key(profile), stories).await?;
        debug!(profile = %profile, count = stories.len(), "Stories saved");
        Ok(())
    }

    /// All stories of a profile. Never fails: read errors are logged and an
    /// empty list is returned.
    pub async fn load_all(&self, profile: ProfileId) -> Vec<Story> {
        match self.read_stories(profile).await {
            Ok(stories) => {
                Self::check_owners(profile, &stories);
                debug!(profile = %profile, count = stories.len(), "Stories loaded");
                stories
            }
            Err(e) => {
                warn!(profile = %profile, error = %e, "Failed to load stories");
                Vec::new()
            }
        }
    }

    pub async fn get(&self, profile: ProfileId, story_id: i64) -> Option<Story> {
        self.load_all(profile)
            .await
            .into_iter()
            .find(|s| s.story_id == story_id)
    }

    /// Replace the whole collection and mark the cache fresh.
    pub async fn save_all(&self, profile: ProfileId, stories: &[Story]) -> CacheResult<()> {
        let _guard = self.locks.lock(&Self::key(profile)).await;
        self.write_stories(profile, stories).await?;
        self.meta.mark_updated(profile).await
    }

    /// Insert or replace a story in its owner's collection.
    ///
    /// The owner is `story.child_id`, which must be a valid profile id.
    /// The cache timestamp is cleared afterwards so the next read refreshes.
    pub async fn upsert(&self, story: Story) -> CacheResult<Upserted> {
        let profile = ProfileId::new(story.child_id)?;
        let _guard = self.locks.lock(&Self::key(profile)).await;

        let mut stories = self.read_stories(profile).await?;
        let story_id = story.story_id;
        let outcome = match stories.iter_mut().find(|s| s.story_id == story_id) {
            Some(existing) => {
                *existing = story;
                Upserted::Updated
            }
            None => {
                stories.push(story);
                Upserted::Inserted
            }
        };

        self.write_stories(profile, &stories).await?;
        self.meta.invalidate(profile).await?;
        match outcome {
            Upserted::Updated => info!(profile = %profile, story_id, "Story updated"),
            Upserted::Inserted => info!(profile = %profile, story_id, "Story inserted"),
        }
        Ok(outcome)
    }

    /// Delete a story together with its section and TTS snapshots.
    ///
    /// Favorite words pointing at the story are left alone; they are pruned
    /// the next time favorites are read. Returns whether the story existed.
    pub async fn remove(&self, profile: ProfileId, story_id: i64) -> CacheResult<bool> {
        self.sections.remove(profile, story_id).await?;
        self.tts.remove(profile, story_id).await?;

        let _guard = self.locks.lock(&Self::key(profile)).await;
        let mut stories = self.read_stories(profile).await?;
        let before = stories.len();
        stories.retain(|s| s.story_id != story_id);
        let removed = stories.len() != before;

        if removed {
            self.write_stories(profile, &stories).await?;
        }
        self.meta.invalidate(profile).await?;
        info!(profile = %profile, story_id, removed, "Story removed");
        Ok(removed)
    }

    /// Flip `is_bookmarked`. Returns the new value, or `None` if the story
    /// is not cached.
    pub async fn toggle_bookmark(&self, profile: ProfileId, story_id: i64) -> CacheResult<Option<bool>> {
        self.toggle(profile, story_id, Preference::Bookmark).await
    }

    /// Flip `is_liked`. Returns the new value, or `None` if the story is not
    /// cached.
    pub async fn toggle_like(&self, profile: ProfileId, story_id: i64) -> CacheResult<Option<bool>> {
        self.toggle(profile, story_id, Preference::Like).await
    }

    async fn toggle(
        &self,
        profile: ProfileId,
        story_id: i64,
        preference: Preference,
    ) -> CacheResult<Option<bool>> {
        let _guard = self.locks.lock(&Self::key(profile)).await;
        let mut stories = self.read_stories(profile).await?;

        let story = match stories.iter_mut().find(|s| s.story_id == story_id) {
            Some(story) => story,
            None => {
                debug!(profile = %profile, story_id, ?preference, "Toggle on unknown story ignored");
                return Ok(None);
            }
        };
        let flag = match preference {
            Preference::Bookmark => &mut story.is_bookmarked,
            Preference::Like => &mut story.is_liked,
        };
        *flag = !*flag;
        let value = *flag;

        self.write_stories(profile, &stories).await?;
        debug!(profile = %profile, story_id, ?preference, value, "Preference toggled");
        Ok(Some(value))
    }

    /// Overlay locally-owned preference flags onto freshly fetched stories.
    ///
    /// Stories that were cached before keep their `is_bookmarked`/`is_liked`;
    /// new ones start with both off.
    pub async fn attach_preferences(&self, profile: ProfileId, remote: Vec<RemoteStory>) -> Vec<Story> {
        let local = self.load_all(profile).await;
        Self::overlay(profile, &local, remote)
    }

    fn overlay(profile: ProfileId, local: &[Story], remote: Vec<RemoteStory>) -> Vec<Story> {
        let prefs: HashMap<i64, (bool, bool)> = local
            .iter()
            .map(|s| (s.story_id, (s.is_bookmarked, s.is_liked)))
            .collect();

        remote
            .into_iter()
            .map(|r| {
                let mut story = r.into_story(profile);
                if let Some(&(bookmarked, liked)) = prefs.get(&story.story_id) {
                    story.is_bookmarked = bookmarked;
                    story.is_liked = liked;
                }
                story
            })
            .collect()
    }

    /// Overlay preferences and persist, all under the collection lock so a
    /// toggle issued mid-sync is not lost.
    pub async fn merge_remote(&self, profile: ProfileId, remote: Vec<RemoteStory>) -> CacheResult<Vec<Story>> {
        let _guard = self.locks.lock(&Self::key(profile)).await;

        let local = match self.read_stories(profile).await {
            Ok(local) => local,
            Err(e) => {
                warn!(profile = %profile, error = %e, "Local stories unreadable, merging without preferences");
                Vec::new()
            }
        };
        let merged = Self::overlay(profile, &local, remote);

        self.write_stories(profile, &merged).await?;
        self.meta.mark_updated(profile).await?;
        Ok(merged)
    }
}

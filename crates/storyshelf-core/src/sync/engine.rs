use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::CacheMeta;
use crate::error::CacheResult;
use crate::keys::{self, ProfileId};
use crate::models::{RemoteStory, Story};
use crate::repo::{remove_keys, StoryRepository};
use crate::store::{self, RecordStore};

use super::StorySource;

/// Where the stories handed back to the caller came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoriesOrigin {
    /// Freshly fetched and merged with local preferences.
    Remote,
    /// Cached collection, still inside the TTL; no fetch attempted.
    FreshCache,
    /// The fetch failed; the cached collection (possibly stale or empty).
    LocalFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncedStories {
    pub stories: Vec<Story>,
    pub origin: StoriesOrigin,
}

/// Fetch, merge, persist and clean up a profile's stories.
#[derive(Clone)]
pub struct ReconciliationEngine {
    store: Arc<dyn RecordStore>,
    meta: CacheMeta,
    stories: StoryRepository,
}

impl ReconciliationEngine {
    pub fn new(store: Arc<dyn RecordStore>, meta: CacheMeta, stories: StoryRepository) -> Self {
        Self { store, meta, stories }
    }

    /// Refresh a profile's stories from `fetch`.
    ///
    /// On success the remote stories get the local bookmark/like flags and
    /// replace the cached collection. On failure the cached collection is
    /// returned instead; the remote error is logged, never returned.
    /// Sections and TTS snapshots are not touched.
    pub async fn sync_stories<F, Fut, E>(&self, profile: ProfileId, fetch: F) -> SyncedStories
    where
        F: FnOnce(ProfileId) -> Fut,
        Fut: Future<Output = Result<Vec<RemoteStory>, E>>,
        E: Display,
    {
        info!(profile = %profile, "Syncing stories");

        let remote = match fetch(profile).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(profile = %profile, error = %e, "Remote fetch failed, using cached stories");
                return SyncedStories {
                    stories: self.stories.load_all(profile).await,
                    origin: StoriesOrigin::LocalFallback,
                };
            }
        };

        let count = remote.len();
        let stories = match self.stories.merge_remote(profile, remote.clone()).await {
            Ok(merged) => merged,
            Err(e) => {
                // Still hand back the merged view; the cache just stays as it was
                warn!(profile = %profile, error = %e, "Failed to persist synced stories");
                self.stories.attach_preferences(profile, remote).await
            }
        };

        info!(profile = %profile, count, "Stories synced");
        SyncedStories {
            stories,
            origin: StoriesOrigin::Remote,
        }
    }

    /// `sync_stories` against a `StorySource`.
    pub async fn sync_from(&self, profile: ProfileId, source: &dyn StorySource) -> SyncedStories {
        self.sync_stories(profile, |p| source.fetch_user_stories(p)).await
    }

    /// The profile's stories, fetching only when the cache is stale.
    pub async fn current_stories<F, Fut, E>(&self, profile: ProfileId, fetch: F) -> SyncedStories
    where
        F: FnOnce(ProfileId) -> Fut,
        Fut: Future<Output = Result<Vec<RemoteStory>, E>>,
        E: Display,
    {
        if self.meta.is_valid(profile).await {
            debug!(profile = %profile, "Story cache fresh, skipping fetch");
            return SyncedStories {
                stories: self.stories.load_all(profile).await,
                origin: StoriesOrigin::FreshCache,
            };
        }
        self.sync_stories(profile, fetch).await
    }

    /// Delete a story, its sections and its TTS snapshot.
    ///
    /// Favorite words attributed to the story stay in storage until the next
    /// `FavoriteWordRepository::load_all` prunes them.
    pub async fn delete_story(&self, profile: ProfileId, story_id: i64) -> CacheResult<bool> {
        let removed = self.stories.remove(profile, story_id).await?;
        info!(profile = %profile, story_id, removed, "Story deleted, favorites left for lazy pruning");
        Ok(removed)
    }

    /// Remove every key under the profile's namespace. Returns how many keys
    /// were removed. Device-wide collections are untouched.
    pub async fn clear_profile(&self, profile: ProfileId) -> CacheResult<usize> {
        let keys = store::keys_with_prefix(self.store.as_ref(), &keys::profile_prefix(profile)).await?;
        let removed = remove_keys(self.store.as_ref(), &keys).await?;
        info!(profile = %profile, removed, "Profile cleared");
        Ok(removed)
    }
}

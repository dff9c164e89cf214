use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::KeyLocks;
use crate::error::CacheResult;
use crate::keys::{self, Collection, ProfileId};
use crate::models::{FavoriteWord, NewFavoriteWord};
use crate::store::{self, RecordStore};

use super::StoryRepository;

/// Favorited vocabulary of a profile, one array under
/// `profile_{id}/favorites`.
///
/// Words whose story has been deleted are dropped lazily: `load_all` filters
/// them out and writes the cleaned list back.
#[derive(Clone)]
pub struct FavoriteWordRepository {
    store: Arc<dyn RecordStore>,
    locks: Arc<KeyLocks>,
    stories: StoryRepository,
}

impl FavoriteWordRepository {
    pub fn new(store: Arc<dyn RecordStore>, locks: Arc<KeyLocks>, stories: StoryRepository) -> Self {
        Self { store, locks, stories }
    }

    fn key(profile: ProfileId) -> String {
        keys::collection_key(profile, Collection::Favorites)
    }

    async fn read_raw(&self, profile: ProfileId) -> CacheResult<Vec<FavoriteWord>> {
        let words: Vec<FavoriteWord> = store::get_json(self.store.as_ref(), &Self::key(profile))
            .await?
            .unwrap_or_default();
        Ok(words)
    }

    async fn write(&self, profile: ProfileId, words: &[FavoriteWord]) -> CacheResult<()> {
        store::set_json(self.store.as_ref(), &Self::key(profile), words).await
    }

    /// Favorites whose story still exists (or that carry no story at all).
    /// Never fails; read errors yield an empty list.
    pub async fn load_all(&self, profile: ProfileId) -> Vec<FavoriteWord> {
        let _guard = self.locks.lock(&Self::key(profile)).await;

        let words = match self.read_raw(profile).await {
            Ok(words) => words,
            Err(e) => {
                warn!(profile = %profile, error = %e, "Failed to load favorite words");
                return Vec::new();
            }
        };

        // An unreadable story list must not be mistaken for "every story deleted"
        let story_ids: HashSet<i64> = match self.stories.read_stories(profile).await {
            Ok(stories) => stories.iter().map(|s| s.story_id).collect(),
            Err(e) => {
                warn!(profile = %profile, error = %e, "Stories unreadable, skipping favorite pruning");
                return words;
            }
        };

        let before = words.len();
        let kept: Vec<FavoriteWord> = words
            .into_iter()
            .filter(|w| w.story_id.map_or(true, |id| story_ids.contains(&id)))
            .collect();

        let pruned = before - kept.len();
        if pruned > 0 {
            info!(profile = %profile, pruned, "Pruning favorites of deleted stories");
            if let Err(e) = self.write(profile, &kept).await {
                warn!(profile = %profile, error = %e, "Failed to write pruned favorites");
            }
        }
        kept
    }

    /// Favorite a word. An existing entry with the same literal word is not
    /// duplicated; its story attribution and timestamp move to this call.
    pub async fn add(&self, profile: ProfileId, word: NewFavoriteWord) -> CacheResult<()> {
        let _guard = self.locks.lock(&Self::key(profile)).await;
        let mut words = self.read_raw(profile).await?;
        let now = Utc::now();

        match words.iter_mut().find(|w| w.word == word.word) {
            Some(existing) => {
                debug!(profile = %profile, word = %word.word, story_id = ?word.story_id, "Favorite re-attributed");
                existing.story_id = word.story_id;
                existing.favorited_at = now;
            }
            None => {
                debug!(profile = %profile, word = %word.word, story_id = ?word.story_id, "Favorite added");
                words.push(word.into_favorite(now));
            }
        }

        self.write(profile, &words).await
    }

    /// Remove every entry for `word`. Returns how many were removed.
    pub async fn remove(&self, profile: ProfileId, word: &str) -> CacheResult<usize> {
        let _guard = self.locks.lock(&Self::key(profile)).await;
        let mut words = self.read_raw(profile).await?;
        let before = words.len();
        words.retain(|w| w.word != word);
        let removed = before - words.len();

        if removed > 0 {
            self.write(profile, &words).await?;
        }
        debug!(profile = %profile, word = %word, removed, "Favorite removed");
        Ok(removed)
    }

    pub async fn by_story(&self, profile: ProfileId, story_id: i64) -> Vec<FavoriteWord> {
        self.load_all(profile)
            .await
            .into_iter()
            .filter(|w| w.story_id == Some(story_id))
            .collect()
    }

    pub async fn contains(&self, profile: ProfileId, word: &str) -> bool {
        self.load_all(profile).await.iter().any(|w| w.word == word)
    }
}

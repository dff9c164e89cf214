use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::cache::{CacheMeta, KeyLocks};
use crate::config::Config;
use crate::repo::{
    FavoriteWordRepository, QuizBookmarkRepository, SectionRepository, StoryRepository, TtsRepository,
};
use crate::store::{FileStore, MemoryStore, RecordStore};
use crate::sync::ReconciliationEngine;

/// Every repository and the reconciliation engine, wired to one store and
/// one set of key locks.
///
/// Cloning is cheap and clones share locks, so concurrent writers through
/// any clone are serialized per collection.
#[derive(Clone)]
pub struct StoryShelf {
    store: Arc<dyn RecordStore>,
    meta: CacheMeta,
    stories: StoryRepository,
    sections: SectionRepository,
    tts: TtsRepository,
    favorites: FavoriteWordRepository,
    quiz_bookmarks: QuizBookmarkRepository,
    engine: ReconciliationEngine,
}

impl StoryShelf {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let locks = Arc::new(KeyLocks::new());
        let meta = CacheMeta::new(store.clone());
        let sections = SectionRepository::new(store.clone());
        let tts = TtsRepository::new(store.clone());
        let stories = StoryRepository::new(
            store.clone(),
            locks.clone(),
            meta.clone(),
            sections.clone(),
            tts.clone(),
        );
        let favorites = FavoriteWordRepository::new(store.clone(), locks.clone(), stories.clone());
        let quiz_bookmarks = QuizBookmarkRepository::new(store.clone(), locks);
        let engine = ReconciliationEngine::new(store.clone(), meta.clone(), stories.clone());

        Self {
            store,
            meta,
            stories,
            sections,
            tts,
            favorites,
            quiz_bookmarks,
            engine,
        }
    }

    /// Shelf over a fresh `MemoryStore`.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Shelf over a `FileStore` in the configured data directory.
    pub async fn open(config: &Config) -> Result<Self> {
        let dir = config.data_dir()?;
        let store = FileStore::new(&dir)
            .await
            .with_context(|| format!("Failed to open record store at {}", dir.display()))?;
        info!(data_dir = %dir.display(), "Record store opened");
        Ok(Self::new(Arc::new(store)))
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn meta(&self) -> &CacheMeta {
        &self.meta
    }

    pub fn stories(&self) -> &StoryRepository {
        &self.stories
    }

    pub fn sections(&self) -> &SectionRepository {
        &self.sections
    }

    pub fn tts(&self) -> &TtsRepository {
        &self.tts
    }

    pub fn favorites(&self) -> &FavoriteWordRepository {
        &self.favorites
    }

    pub fn quiz_bookmarks(&self) -> &QuizBookmarkRepository {
        &self.quiz_bookmarks
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }
}

//! StoryShelf core - profile-scoped offline cache for a children's story app.
//!
//! Stories, story sections, generated TTS audio, favorited words and quiz
//! bookmarks are kept in a key-value `RecordStore` so the app works offline.
//! Each profile's data lives under its own `profile_{id}/` namespace. The
//! `ReconciliationEngine` refreshes stories from the remote service and keeps
//! locally-owned bookmark/like flags across refreshes.
//!
//! The host application installs the tracing subscriber; this crate only
//! emits events.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod repo;
pub mod shelf;
pub mod store;
pub mod sync;

pub use api::{ApiError, HttpStorySource};
pub use cache::{CacheMeta, CacheStatus, CACHE_TTL_MINUTES};
pub use config::Config;
pub use error::{CacheError, CacheResult, StoreError, StoreResult};
pub use keys::{Collection, ProfileId};
pub use models::{FavoriteWord, NewFavoriteWord, QuizBookmark, RemoteStory, Story, StorySection, TtsAudio, TtsSnapshot};
pub use repo::{
    FavoriteWordRepository, QuizBookmarkRepository, SectionRepository, StoryRepository, TtsRepository, Upserted,
};
pub use shelf::StoryShelf;
pub use store::{FileStore, MemoryStore, RecordStore};
pub use sync::{ReconciliationEngine, StoriesOrigin, StorySource, SyncedStories};

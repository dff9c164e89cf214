//! Repositories over the record store.
//!
//! Reads never fail: errors are logged and an empty value is returned.
//! Writes return `CacheResult` so callers decide whether a failed write
//! matters to them.

pub mod favorites;
pub mod quiz_bookmarks;
pub mod sections;
pub mod stories;
pub mod tts;

use futures::future::join_all;

use crate::error::StoreResult;
use crate::store::RecordStore;

pub use favorites::FavoriteWordRepository;
pub use quiz_bookmarks::QuizBookmarkRepository;
pub use sections::SectionRepository;
pub use stories::{StoryRepository, Upserted};
pub use tts::TtsRepository;

/// Remove `keys` concurrently. Every removal is attempted; the first failure
/// is returned afterwards.
pub(crate) async fn remove_keys(store: &dyn RecordStore, keys: &[String]) -> StoreResult<usize> {
    let results = join_all(keys.iter().map(|key| store.remove(key))).await;
    let mut removed = 0;
    let mut first_error = None;
    for result in results {
        match result {
            Ok(()) => removed += 1,
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(removed),
    }
}

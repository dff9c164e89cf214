use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::KeyLocks;
use crate::error::CacheResult;
use crate::keys::QUIZ_BOOKMARKS_KEY;
use crate::models::QuizBookmark;
use crate::store::{self, RecordStore};

/// Bookmarked quizzes. Unlike every other collection this one is shared by
/// all profiles on the device and lives under the bare `quiz_bookmarks` key.
#[derive(Clone)]
pub struct QuizBookmarkRepository {
    store: Arc<dyn RecordStore>,
    locks: Arc<KeyLocks>,
}

impl QuizBookmarkRepository {
    pub fn new(store: Arc<dyn RecordStore>, locks: Arc<KeyLocks>) -> Self {
        Self { store, locks }
    }

    async fn read(&self) -> CacheResult<Vec<QuizBookmark>> {
        let quizzes: Vec<QuizBookmark> = store::get_json(self.store.as_ref(), QUIZ_BOOKMARKS_KEY)
            .await?
            .unwrap_or_default();
        Ok(quizzes)
    }

    pub async fn load_all(&self) -> Vec<QuizBookmark> {
        match self.read().await {
            Ok(quizzes) => quizzes,
            Err(e) => {
                warn!(error = %e, "Failed to load quiz bookmarks");
                Vec::new()
            }
        }
    }

    /// Bookmark a quiz. Returns `false` if it was already bookmarked.
    pub async fn add(&self, quiz: QuizBookmark) -> CacheResult<bool> {
        let _guard = self.locks.lock(QUIZ_BOOKMARKS_KEY).await;
        let mut quizzes = self.read().await?;
        if quizzes.iter().any(|q| q.quiz_id == quiz.quiz_id) {
            debug!(quiz_id = quiz.quiz_id, "Quiz already bookmarked");
            return Ok(false);
        }

        debug!(quiz_id = quiz.quiz_id, "Quiz bookmarked");
        quizzes.push(quiz);
        store::set_json(self.store.as_ref(), QUIZ_BOOKMARKS_KEY, &quizzes).await?;
        Ok(true)
    }

    /// Returns whether a bookmark was removed.
    pub async fn remove(&self, quiz_id: i64) -> CacheResult<bool> {
        let _guard = self.locks.lock(QUIZ_BOOKMARKS_KEY).await;
        let mut quizzes = self.read().await?;
        let before = quizzes.len();
        quizzes.retain(|q| q.quiz_id != quiz_id);
        if quizzes.len() == before {
            return Ok(false);
        }

        store::set_json(self.store.as_ref(), QUIZ_BOOKMARKS_KEY, &quizzes).await?;
        debug!(quiz_id, "Quiz bookmark removed");
        Ok(true)
    }

    pub async fn clear_all(&self) -> CacheResult<()> {
        let _guard = self.locks.lock(QUIZ_BOOKMARKS_KEY).await;
        self.store.remove(QUIZ_BOOKMARKS_KEY).await?;
        debug!("Quiz bookmarks cleared");
        Ok(())
    }

    pub async fn contains(&self, quiz_id: i64) -> bool {
        self.load_all().await.iter().any(|q| q.quiz_id == quiz_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, QuizBookmarkRepository) {
        let store = Arc::new(MemoryStore::new());
        let repo = QuizBookmarkRepository::new(store.clone(), Arc::new(KeyLocks::new()));
        (store, repo)
    }

    fn quiz(id: i64) -> QuizBookmark {
        QuizBookmark::new(
            id,
            "What did the fox find?",
            vec!["A moon".to_string(), "A key".to_string()],
        )
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let (_, repo) = setup();
        assert!(repo.add(quiz(1)).await.unwrap());
        assert!(!repo.add(quiz(1)).await.unwrap());
        assert!(repo.add(quiz(2)).await.unwrap());
        assert_eq!(repo.load_all().await.len(), 2);
        assert!(repo.contains(1).await);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let (store, repo) = setup();
        repo.add(quiz(1)).await.unwrap();
        repo.add(quiz(2)).await.unwrap();

        assert!(repo.remove(1).await.unwrap());
        assert!(!repo.remove(1).await.unwrap());
        assert!(!repo.contains(1).await);

        repo.clear_all().await.unwrap();
        assert!(repo.load_all().await.is_empty());
        assert!(store.get(QUIZ_BOOKMARKS_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stored_under_global_key() {
        let (store, repo) = setup();
        repo.add(quiz(3)).await.unwrap();
        let keys = store.list_keys().await.unwrap();
        assert_eq!(keys, vec!["quiz_bookmarks"]);
    }
}

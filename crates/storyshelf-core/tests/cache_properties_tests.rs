//! End-to-end behavior of the profile cache over an in-memory store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use storyshelf_core::{
    ApiError, CacheError, MemoryStore, NewFavoriteWord, ProfileId, RecordStore, RemoteStory, Story,
    StoriesOrigin, StorySection, StoryShelf, TtsAudio, TtsSnapshot,
};

fn profile(raw: i64) -> ProfileId {
    ProfileId::new(raw).unwrap()
}

fn story(id: i64, child: i64) -> Story {
    Story {
        story_id: id,
        title: format!("Story {}", id),
        content: "The fox was brave.".to_string(),
        content_kr: "여우는 용감했다.".to_string(),
        keywords: vec!["fox".to_string(), "brave".to_string()],
        created_at: Some("2024-05-01T10:00:00Z".to_string()),
        updated_at: Some("2024-05-01T10:00:00Z".to_string()),
        child_id: child,
        is_bookmarked: false,
        is_liked: false,
    }
}

fn remote(id: i64) -> RemoteStory {
    RemoteStory {
        story_id: id,
        title: format!("Remote {}", id),
        content: "fresh from the server".to_string(),
        content_kr: String::new(),
        keywords: vec![],
        created_at: None,
        updated_at: None,
    }
}

fn word(text: &str, story_id: i64) -> NewFavoriteWord {
    NewFavoriteWord {
        word: text.to_string(),
        meaning: "용감한".to_string(),
        example_eng: "The brave fox.".to_string(),
        example_kor: "용감한 여우.".to_string(),
        story_id: Some(story_id),
    }
}

fn shelf() -> (Arc<MemoryStore>, StoryShelf) {
    let store = Arc::new(MemoryStore::new());
    (store.clone(), StoryShelf::new(store))
}

// ============================================================================
// Stories
// ============================================================================

#[tokio::test]
async fn test_upsert_then_load_contains_story() {
    let (_, shelf) = shelf();
    let s = story(3, 42);

    shelf.stories().upsert(s.clone()).await.unwrap();

    let loaded = shelf.stories().load_all(profile(42)).await;
    assert!(loaded.contains(&s));
}

#[tokio::test]
async fn test_upsert_twice_keeps_length_and_second_value() {
    let (_, shelf) = shelf();
    let p = profile(42);
    shelf.stories().save_all(p, &[story(1, 42)]).await.unwrap();

    let mut first = story(3, 42);
    first.title = "first".to_string();
    let mut second = story(3, 42);
    second.title = "second".to_string();

    shelf.stories().upsert(first).await.unwrap();
    let len = shelf.stories().load_all(p).await.len();
    shelf.stories().upsert(second.clone()).await.unwrap();

    let loaded = shelf.stories().load_all(p).await;
    assert_eq!(loaded.len(), len);
    assert_eq!(loaded.iter().find(|s| s.story_id == 3), Some(&second));
}

#[tokio::test]
async fn test_save_all_then_load_returns_exactly_that_story() {
    let (_, shelf) = shelf();
    shelf.stories().save_all(profile(42), &[story(1, 42)]).await.unwrap();

    let loaded = shelf.stories().load_all(profile(42)).await;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].story_id, 1);
}

#[tokio::test]
async fn test_toggle_bookmark_twice_restores_original() {
    let (_, shelf) = shelf();
    let p = profile(42);
    let mut s = story(1, 42);
    s.is_bookmarked = true;
    shelf.stories().save_all(p, &[s]).await.unwrap();

    shelf.stories().toggle_bookmark(p, 1).await.unwrap();
    shelf.stories().toggle_bookmark(p, 1).await.unwrap();

    assert!(shelf.stories().get(p, 1).await.unwrap().is_bookmarked);
}

#[tokio::test]
async fn test_invalid_profile_is_rejected_before_io() {
    let (store, shelf) = shelf();

    assert!(matches!("0".parse::<ProfileId>(), Err(CacheError::InvalidNamespace(_))));
    assert!(matches!("kid".parse::<ProfileId>(), Err(CacheError::InvalidNamespace(_))));

    let result = shelf.stories().upsert(story(1, -4)).await;
    assert!(matches!(result, Err(CacheError::InvalidNamespace(_))));
    assert!(store.is_empty().await);
}

// ============================================================================
// Cache TTL
// ============================================================================

#[tokio::test]
async fn test_ttl_lifecycle() {
    let (store, shelf) = shelf();
    let p = profile(42);

    shelf.stories().save_all(p, &[story(1, 42)]).await.unwrap();
    assert!(shelf.meta().is_valid(p).await);

    shelf.meta().invalidate(p).await.unwrap();
    assert!(!shelf.meta().is_valid(p).await);

    let old = (Utc::now() - Duration::minutes(5)).timestamp_millis();
    store
        .set("profile_42/stories_last_update", old.to_string())
        .await
        .unwrap();
    assert!(!shelf.meta().is_valid(p).await);
    assert!(!shelf.meta().status(p).await.fresh);
}

// ============================================================================
// Cascade and lazy pruning
// ============================================================================

#[tokio::test]
async fn test_delete_story_cascades() {
    let (_, shelf) = shelf();
    let p = profile(42);
    shelf.stories().save_all(p, &[story(1, 42), story(2, 42)]).await.unwrap();
    shelf
        .sections()
        .save(
            p,
            1,
            &[StorySection {
                section_id: 100,
                story_id: 1,
                order_index: 0,
                paragraph: "The fox was brave.".to_string(),
                paragraph_kr: "여우는 용감했다.".to_string(),
            }],
        )
        .await
        .unwrap();
    let mut snapshot = TtsSnapshot::new();
    snapshot.insert(
        "nova",
        "100",
        TtsAudio {
            audio_path: Some("/data/audio/100.mp3".to_string()),
            tts_url: Some("https://cdn.example/100.mp3".to_string()),
        },
    );
    shelf.tts().save(p, 1, &snapshot).await.unwrap();

    assert!(shelf.engine().delete_story(p, 1).await.unwrap());

    assert!(shelf.sections().load(p, 1).await.is_empty());
    assert!(shelf.tts().load(p, 1).await.is_empty());
    let ids: Vec<i64> = shelf.stories().load_all(p).await.iter().map(|s| s.story_id).collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn test_favorites_of_deleted_story_pruned_lazily() {
    let (store, shelf) = shelf();
    let p = profile(42);
    shelf.stories().save_all(p, &[story(1, 42), story(2, 42)]).await.unwrap();
    shelf.favorites().add(p, word("brave", 1)).await.unwrap();
    shelf.favorites().add(p, word("moon", 2)).await.unwrap();

    shelf.engine().delete_story(p, 2).await.unwrap();

    // Still stored until the next read
    let raw = store.get("profile_42/favorites").await.unwrap().unwrap();
    assert!(raw.contains("moon"));

    let words: Vec<String> = shelf.favorites().load_all(p).await.into_iter().map(|w| w.word).collect();
    assert_eq!(words, vec!["brave"]);

    let raw = store.get("profile_42/favorites").await.unwrap().unwrap();
    assert!(!raw.contains("moon"));
}

#[tokio::test]
async fn test_favorite_word_follows_latest_story() {
    let (_, shelf) = shelf();
    let p = profile(42);
    shelf.stories().save_all(p, &[story(1, 42), story(2, 42)]).await.unwrap();

    shelf.favorites().add(p, word("brave", 1)).await.unwrap();
    shelf.favorites().add(p, word("brave", 2)).await.unwrap();

    let words = shelf.favorites().load_all(p).await;
    let brave: Vec<_> = words.iter().filter(|w| w.word == "brave").collect();
    assert_eq!(brave.len(), 1);
    assert_eq!(brave[0].story_id, Some(2));
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test]
async fn test_preferences_survive_remote_refresh() {
    let (_, shelf) = shelf();
    let p = profile(42);
    let mut local = story(7, 42);
    local.is_bookmarked = true;
    shelf.stories().save_all(p, &[local]).await.unwrap();

    let merged = shelf.stories().attach_preferences(p, vec![remote(7)]).await;
    assert!(merged[0].is_bookmarked);

    let synced = shelf
        .engine()
        .sync_stories(p, |_| async { Ok::<_, ApiError>(vec![remote(7), remote(8)]) })
        .await;
    assert_eq!(synced.origin, StoriesOrigin::Remote);
    assert!(synced.stories.iter().find(|s| s.story_id == 7).unwrap().is_bookmarked);
    assert!(!synced.stories.iter().find(|s| s.story_id == 8).unwrap().is_bookmarked);
}

#[tokio::test]
async fn test_offline_sync_returns_cached_stories() {
    let (_, shelf) = shelf();
    let p = profile(42);
    shelf.stories().save_all(p, &[story(1, 42)]).await.unwrap();

    let synced = shelf
        .engine()
        .sync_stories(p, |_| async { Err::<Vec<RemoteStory>, _>(ApiError::ServerError("down".to_string())) })
        .await;

    assert_eq!(synced.origin, StoriesOrigin::LocalFallback);
    assert_eq!(synced.stories, vec![story(1, 42)]);
}

#[tokio::test]
async fn test_sync_does_not_touch_sections() {
    let (_, shelf) = shelf();
    let p = profile(42);
    let section = StorySection {
        section_id: 1,
        story_id: 9,
        order_index: 0,
        paragraph: "kept".to_string(),
        paragraph_kr: String::new(),
    };
    shelf.sections().save(p, 9, &[section.clone()]).await.unwrap();

    shelf
        .engine()
        .sync_stories(p, |_| async { Ok::<_, ApiError>(vec![remote(1)]) })
        .await;

    assert_eq!(shelf.sections().load(p, 9).await, vec![section]);
}

#[tokio::test]
async fn test_profiles_never_see_each_other() {
    let (store, shelf) = shelf();
    shelf.stories().save_all(profile(1), &[story(1, 1)]).await.unwrap();
    shelf.favorites().add(profile(1), word("brave", 1)).await.unwrap();

    assert!(shelf.stories().load_all(profile(2)).await.is_empty());
    assert!(shelf.favorites().load_all(profile(2)).await.is_empty());

    for key in store.list_keys().await.unwrap() {
        assert!(key.starts_with("profile_1/"), "unexpected key {}", key);
    }
}

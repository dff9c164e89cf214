//! File-backed record store.
//!
//! Each key becomes one JSON file under the data directory. `/` in a key
//! maps to a subdirectory, so `profile_42/stories` is stored at
//! `<root>/profile_42/stories.json`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

use super::RecordStore;

/// Extension appended to every stored key.
const RECORD_EXTENSION: &str = "json";

/// Marker in temp file names; such files are never listed as keys.
const TEMP_MARKER: &str = ".tmp.";

pub struct FileStore {
    root: PathBuf,
    temp_counter: AtomicU64,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            temp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to its file path, rejecting anything that could escape the root.
    fn key_path(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".to_string()));
        }
        if key.contains('\\') || key.contains('\0') {
            return Err(StoreError::InvalidKey(format!("illegal character in key: {}", key)));
        }

        let segments: Vec<&str> = key.split('/').collect();
        for segment in &segments {
            if segment.is_empty() || *segment == "." || *segment == ".." {
                return Err(StoreError::InvalidKey(format!("unsafe key segment: {}", key)));
            }
            if segment.contains(TEMP_MARKER) {
                return Err(StoreError::InvalidKey(format!("reserved key segment: {}", key)));
            }
        }

        let mut path = self.root.clone();
        if let Some((last, parents)) = segments.split_last() {
            for parent in parents {
                path.push(parent);
            }
            path.push(format!("{}.{}", last, RECORD_EXTENSION));
        }
        Ok(path)
    }

    /// Reverse of `key_path` for a file found while walking the root.
    fn path_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let name = relative.file_name()?.to_str()?;
        if name.contains(TEMP_MARKER) {
            return None;
        }
        let stem = name.strip_suffix(&format!(".{}", RECORD_EXTENSION))?;

        let mut segments: Vec<String> = Vec::new();
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                segments.push(component.as_os_str().to_str()?.to_string());
            }
        }
        segments.push(stem.to_string());
        Some(segments.join("/"))
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        let path = self.key_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write beside the target, then rename over it
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        let mut temp = path.clone().into_os_string();
        temp.push(format!("{}{}-{}", TEMP_MARKER, std::process::id(), n));
        let temp = PathBuf::from(temp);

        fs::write(&temp, value.as_bytes()).await?;
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        debug!(key = key, "Record written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    if let Some(key) = self.path_key(&path) {
                        keys.push(key);
                    }
                }
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).await.unwrap();

        store
            .set("profile_42/stories", "[{\"storyId\":1}]".to_string())
            .await
            .unwrap();
        let value = store.get("profile_42/stories").await.unwrap();
        assert_eq!(value.as_deref(), Some("[{\"storyId\":1}]"));
        assert!(dir.path().join("profile_42").join("stories.json").exists());
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).await.unwrap();
        assert_eq!(store.get("profile_1/favorites").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).await.unwrap();

        store.set("quiz_bookmarks", "[]".to_string()).await.unwrap();
        store.remove("quiz_bookmarks").await.unwrap();
        store.remove("quiz_bookmarks").await.unwrap();
        assert_eq!(store.get("quiz_bookmarks").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_keys_reconstructs_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).await.unwrap();

        store.set("quiz_bookmarks", "[]".to_string()).await.unwrap();
        store.set("profile_1/stories", "[]".to_string()).await.unwrap();
        store.set("profile_1/story_tts_3", "{}".to_string()).await.unwrap();
        store.set("profile_1/progress/9", "{}".to_string()).await.unwrap();

        let mut keys = store.list_keys().await.unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "profile_1/progress/9",
                "profile_1/stories",
                "profile_1/story_tts_3",
                "quiz_bookmarks",
            ]
        );
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).await.unwrap();

        for key in ["../escape", "/etc/passwd", "a//b", "a/./b", "", "a\\b", "x.tmp.1"] {
            let result = store.set(key, "1".to_string()).await;
            assert!(
                matches!(result, Err(StoreError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_reopen_sees_previous_writes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::new(dir.path()).await.unwrap();
            store.set("profile_7/favorites", "[]".to_string()).await.unwrap();
        }
        let store = FileStore::new(dir.path()).await.unwrap();
        assert_eq!(store.get("profile_7/favorites").await.unwrap().as_deref(), Some("[]"));
    }
}

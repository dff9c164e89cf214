//! Key-value persistence primitive.
//!
//! A `RecordStore` holds UTF-8 JSON strings under string keys. It has no
//! transactions and no multi-key atomicity; repositories layer their own
//! locking on top (see `cache::locks`).
//!
//! Backends:
//! - `MemoryStore`: in-process map, for tests and throwaway sessions
//! - `FileStore`: one JSON file per key under a data directory

pub mod file;
pub mod memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheResult, StoreResult};

pub use file::FileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: String) -> StoreResult<()>;

    /// Delete `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// Every key currently present, in no particular order.
    async fn list_keys(&self) -> StoreResult<Vec<String>>;
}

/// Read and decode a JSON value. Absent keys decode to `None`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    store: &dyn RecordStore,
    key: &str,
) -> CacheResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and write it under `key`.
pub(crate) async fn set_json<T: Serialize + ?Sized>(
    store: &dyn RecordStore,
    key: &str,
    value: &T,
) -> CacheResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw).await?;
    Ok(())
}

/// Keys starting with `prefix`.
pub(crate) async fn keys_with_prefix(
    store: &dyn RecordStore,
    prefix: &str,
) -> StoreResult<Vec<String>> {
    let keys = store.list_keys().await?;
    Ok(keys.into_iter().filter(|k| k.starts_with(prefix)).collect())
}

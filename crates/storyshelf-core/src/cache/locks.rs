use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per store key.
///
/// Every repository write is "load whole collection, mutate, save whole
/// collection". Holding the key's guard across that sequence keeps two
/// writers on the same collection from overwriting each other. Different
/// keys (and therefore different profiles) never contend.
///
/// Entries are never removed. The map holds at most one mutex per
/// collection key ever locked, i.e. profiles times collections.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the shard guard is released before awaiting
        let mutex = self.locks.entry(key.to_string()).or_default().clone();
        mutex.lock_owned().await
    }
}

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per key.
///
/// Work on different keys proceeds in parallel; work on the same key is
/// admitted one caller at a time, in the order the tokio mutex grants it.
pub struct KeyedLocks<K> {
    slots: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Waits for exclusive access to `key`. Access ends when the guard is dropped.
    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        // The map shard guard must be released before awaiting the mutex.
        let slot = self.slots.entry(key.clone()).or_default().clone();
        slot.lock_owned().await
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

//! Short-lived response cache so page reloads do not hammer the API.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Key-value cache whose entries expire after a fixed TTL.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh value for `key`, if any.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        // Expired entries are only dropped on write
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), value));
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_after_insert() {
        let cache = TtlCache::new(Duration::from_secs(30));
        cache.insert("0xabc".to_string(), 7u32).await;

        assert_eq!(cache.get(&"0xabc".to_string()).await, Some(7));
        assert_eq!(cache.get(&"0xdef".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert(1u8, "stale").await;
        assert_eq!(cache.get(&1).await, None);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = TtlCache::new(Duration::from_secs(30));
        cache.insert(1u8, 1u8).await;
        cache.insert(2u8, 2u8).await;
        assert_eq!(cache.get(&2).await, Some(2));

        cache.clear().await;
        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.get(&2).await, None);
    }
}

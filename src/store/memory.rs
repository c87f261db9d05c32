use crate::core::cache::Cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// In-memory TTL cache. Expired entries are dropped by the next lookup.
pub struct MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        {
            let cache = self.inner.read().await;
            match cache.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    debug!("Cache HIT for key: {:?}", key);
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => {
                    debug!("Cache MISS for key: {:?}", key);
                    return None;
                }
            }
        }

        // Re-check under the write lock, a concurrent put may have refreshed it
        let mut cache = self.inner.write().await;
        if let Some(entry) = cache.get(key) {
            if entry.expires_at > Instant::now() {
                return Some(entry.value.clone());
            }
            debug!("Cache entry expired for key: {:?}", key);
            cache.remove(key);
        }
        None
    }

    async fn put(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };

        let mut cache = self.inner.write().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::sleep;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = MemoryCache::<String, i32>::new();

        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache.put("key1".to_string(), 123, TTL).await;

        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));
        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_ttl_expiration() {
        let cache = MemoryCache::<String, i32>::new();

        cache
            .put("key1".to_string(), 123, Duration::from_millis(10))
            .await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
        // Lazily evicted by the lookup above
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_last_put_wins() {
        let cache = MemoryCache::<String, i32>::new();

        cache.put("key1".to_string(), 1, TTL).await;
        cache.put("key1".to_string(), 2, TTL).await;

        assert_eq!(cache.get(&"key1".to_string()).await, Some(2));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access() {
        let cache = Arc::new(MemoryCache::<String, usize>::new());

        let tasks = (0..64).map(|i| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                let key = format!("key{}", i % 8);
                cache.put(key.clone(), i, TTL).await;
                cache.get(&key).await
            })
        });

        for result in futures::future::join_all(tasks).await {
            assert!(result.unwrap().is_some());
        }
        assert_eq!(cache.len().await, 8);
    }
}

//! In-memory cache - used when Redis is not configured or unreachable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use contentoire_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }
}

/// HashMap cache behind an async RwLock. Entries are lost on restart.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every expired entry and return how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(now));
        before - store.len()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if entry.is_expired(Instant::now()) {
            drop(store);
            self.store.write().await.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let expires_at = ttl.map(|d| Instant::now() + d);
        self.store.write().await.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemoryCache::new();
        cache.set("revoked:abc", "1", None).await.unwrap();
        assert_eq!(cache.get("revoked:abc").await, Some("1".to_string()));

        cache.delete("revoked:abc").await.unwrap();
        assert!(!cache.exists("revoked:abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = InMemoryCache::new();
        cache
            .set("short", "1", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        cache.set("long", "1", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(!cache.exists("short").await.unwrap());
        assert!(cache.exists("long").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = InMemoryCache::new();
        cache
            .set("a", "1", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        cache
            .set("b", "1", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        cache.set("c", "1", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.purge_expired().await, 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_set_until_past_instant_is_noop() {
        let cache = InMemoryCache::new();
        cache
            .set_until("gone", "1", Utc::now() - TimeDelta::minutes(1))
            .await
            .unwrap();
        assert!(!cache.exists("gone").await.unwrap());

        cache
            .set_until("kept", "1", Utc::now() + TimeDelta::hours(1))
            .await
            .unwrap();
        assert!(cache.exists("kept").await.unwrap());
    }
}

//! Named response caches: a platform-style key-value store of
//! (URL -> response) grouped under version-qualified names.
//!
//! Individual operations are atomic behind one lock; interleaved fetches for
//! the same URL race with last-write-wins semantics, and no multi-step
//! transaction spans a write.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

/// A stored HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body,
        }
    }
}

type CacheMap = HashMap<String, AssetResponse>;

#[derive(Clone, Default)]
pub struct CacheStorage {
    caches: Arc<RwLock<HashMap<String, CacheMap>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the named cache if it does not exist yet.
    pub async fn open(&self, name: &str) {
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default();
    }

    /// Store a response under (cache, URL), creating the cache as needed.
    pub async fn put(&self, name: &str, url: &str, response: AssetResponse) {
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    /// Exact-URL lookup within one named cache.
    pub async fn match_in(&self, name: &str, url: &str) -> Option<AssetResponse> {
        self.caches.read().await.get(name)?.get(url).cloned()
    }

    /// Exact-URL lookup across every named cache, like the platform's
    /// top-level match.
    pub async fn match_any(&self, url: &str) -> Option<AssetResponse> {
        let caches = self.caches.read().await;
        caches.values().find_map(|cache| cache.get(url).cloned())
    }

    pub async fn delete(&self, name: &str) -> bool {
        let removed = self.caches.write().await.remove(name).is_some();
        if removed {
            debug!(target: "cache_worker", cache = %name, "deleted cache");
        }
        removed
    }

    pub async fn has(&self, name: &str) -> bool {
        self.caches.read().await.contains_key(name)
    }

    pub async fn cache_names(&self) -> Vec<String> {
        self.caches.read().await.keys().cloned().collect()
    }

    /// URLs stored in one named cache.
    pub async fn keys_in(&self, name: &str) -> Vec<String> {
        match self.caches.read().await.get(name) {
            Some(cache) => cache.keys().cloned().collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_match() {
        let storage = CacheStorage::new();
        storage
            .put("app-v1", "https://host/a", AssetResponse::ok(b"a".to_vec()))
            .await;

        let hit = storage.match_in("app-v1", "https://host/a").await.unwrap();
        assert_eq!(hit.body, b"a");
        assert!(storage.match_in("app-v1", "https://host/b").await.is_none());
        assert!(storage.match_in("app-v2", "https://host/a").await.is_none());
    }

    #[tokio::test]
    async fn match_any_searches_all_caches() {
        let storage = CacheStorage::new();
        storage
            .put("app-v1", "https://host/a", AssetResponse::ok(b"old".to_vec()))
            .await;

        assert!(storage.match_any("https://host/a").await.is_some());
        assert!(storage.match_any("https://host/missing").await.is_none());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let storage = CacheStorage::new();
        storage
            .put("app-v1", "https://host/a", AssetResponse::ok(b"one".to_vec()))
            .await;
        storage
            .put("app-v1", "https://host/a", AssetResponse::ok(b"two".to_vec()))
            .await;

        let hit = storage.match_in("app-v1", "https://host/a").await.unwrap();
        assert_eq!(hit.body, b"two");
    }

    #[tokio::test]
    async fn delete_removes_the_whole_cache() {
        let storage = CacheStorage::new();
        storage.open("app-v1").await;
        assert!(storage.has("app-v1").await);
        assert!(storage.delete("app-v1").await);
        assert!(!storage.has("app-v1").await);
        assert!(!storage.delete("app-v1").await);
    }
}

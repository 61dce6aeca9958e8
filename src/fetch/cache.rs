//! Query Cache
//!
//! Successful reads keyed by method and path. Writes invalidate the keys
//! of the collection they touch so the next read goes back to the API.

use super::FetchResponse;
use lru::LruCache;
use reqwest::Method;
use serde_json::Value;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

/// Entries kept when no capacity is configured
pub const DEFAULT_CAPACITY: usize = 256;

/// Cache key: HTTP method plus path and query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: Method,
    pub path: String,
}

impl CacheKey {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }
}

/// Shared cache of decoded responses
///
/// Bounded: once full, the least recently read entry makes room.
#[derive(Debug)]
pub struct QueryCache {
    entries: Mutex<LruCache<CacheKey, FetchResponse<Value>>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` entries (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<FetchResponse<Value>> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, response: FetchResponse<Value>) {
        if let Some((evicted, _)) = self.entries.lock().await.push(key.clone(), response) {
            if evicted != key {
                tracing::trace!(path = %evicted.path, "Evicted cached query");
            }
        }
    }

    /// Drop a single path (all methods)
    pub async fn invalidate(&self, path: &str) {
        self.remove_where(|key| key.path == path).await;
    }

    /// Drop a collection path and every page or filter of it
    /// (`/heroes`, `/heroes?page=2`, ...)
    pub async fn invalidate_collection(&self, collection_path: &str) {
        let query_prefix = format!("{}?", collection_path);
        let dropped = self
            .remove_where(|key| key.path == collection_path || key.path.starts_with(&query_prefix))
            .await;
        tracing::debug!(
            collection = %collection_path,
            dropped,
            "Invalidated cached collection"
        );
    }

    async fn remove_where(&self, matches: impl Fn(&CacheKey) -> bool) -> usize {
        let mut entries = self.entries.lock().await;
        let stale: Vec<CacheKey> = entries
            .iter()
            .map(|(key, _)| key)
            .filter(|key| matches(key))
            .cloned()
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        stale.len()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.entries.lock().await.cap().get()
    }
}

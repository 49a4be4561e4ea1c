use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// Key-value store with optional per-entry expiry.
///
/// `ttl: None` stores the entry permanently. Expired entries read as a miss.
/// There are no conditional writes: the last `put` for a key wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()>;

    /// Drop expired entries and return how many were removed.
    async fn purge_expired(&self) -> Result<u64>;

    fn backend_name(&self) -> &'static str;
}

/// JSON view over a [`CacheStore`].
///
/// Reads never fail: store errors and undecodable entries are logged and
/// reported as a miss, so a broken cache degrades to re-fetching.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.put(key, raw, ttl).await
    }

    /// Like [`Cache::put_json`], but failures are only logged.
    pub async fn put_json_logged<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        if let Err(e) = self.put_json(key, value, ttl).await {
            tracing::warn!(key, error = %e, "Cache write failed");
        }
    }
}

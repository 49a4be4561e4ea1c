use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::clock::{expiry_after, Clock, SystemClock};
use super::store::CacheStore;
use crate::error::{BearBitesError, Result};

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-process cache.
///
/// Expiring entries live in a bounded LRU; permanent entries live in a
/// separate map so capacity pressure can never evict them.
pub struct MemoryCacheStore {
    expiring: Mutex<LruCache<String, Entry>>,
    permanent: Mutex<HashMap<String, String>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCacheStore {
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            expiring: Mutex::new(LruCache::new(capacity)),
            permanent: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        let expiring = self.expiring.lock().map(|c| c.len()).unwrap_or(0);
        let permanent = self.permanent.lock().map(|m| m.len()).unwrap_or(0);
        expiring + permanent
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
        mutex
            .lock()
            .map_err(|_| BearBitesError::Cache("memory cache lock poisoned".to_string()))
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = Self::lock(&self.permanent)?.get(key) {
            return Ok(Some(value.clone()));
        }

        let mut expiring = Self::lock(&self.expiring)?;
        match expiring.get(key) {
            None => return Ok(None),
            Some(entry) if entry.expires_at > self.clock.now() => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }
        expiring.pop(key);
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        match ttl {
            Some(ttl) => {
                Self::lock(&self.permanent)?.remove(key);
                let expires_at = expiry_after(self.clock.now(), ttl);
                Self::lock(&self.expiring)?.put(key.to_string(), Entry { value, expires_at });
            }
            None => {
                Self::lock(&self.expiring)?.pop(key);
                Self::lock(&self.permanent)?.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let now = self.clock.now();
        let mut expiring = Self::lock(&self.expiring)?;
        let expired: Vec<String> = expiring
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            expiring.pop(key);
        }
        Ok(expired.len() as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

//! Tiered artifact cache: menus, food details, date bounds and permanent
//! spicy classifications, each under its own key namespace and lifetime.

mod clock;
pub mod keys;
mod memory;
mod persistent;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::MemoryCacheStore;
pub use persistent::LibSqlCacheStore;
pub use store::{Cache, CacheStore};

use std::sync::Arc;

use crate::config::CacheConfig;
use crate::db::Database;
use crate::error::Result;

/// Build the configured backend: libsql when a database URL is set,
/// otherwise an in-process LRU.
pub async fn open_cache(config: &CacheConfig) -> Result<Cache> {
    let store: Arc<dyn CacheStore> = match &config.url {
        Some(url) => {
            let db = Database::open(url, config.auth_token.as_deref()).await?;
            Arc::new(LibSqlCacheStore::new(db))
        }
        None => Arc::new(MemoryCacheStore::new(config.memory_capacity)),
    };

    tracing::info!(backend = store.backend_name(), "Cache initialised");
    Ok(Cache::new(store))
}

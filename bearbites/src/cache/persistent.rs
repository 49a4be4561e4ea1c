use async_trait::async_trait;
use chrono::Utc;
use libsql::params;
use std::sync::Arc;
use std::time::Duration;

use super::clock::{expiry_after, Clock, SystemClock};
use super::store::CacheStore;
use crate::db::Database;
use crate::error::Result;

/// Cache entries persisted in a libsql table, shared across restarts and,
/// with a remote database, across instances.
pub struct LibSqlCacheStore {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl LibSqlCacheStore {
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }
}

#[async_trait]
impl CacheStore for LibSqlCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .db
            .connection()
            .query(
                "SELECT value, expires_at FROM cache_entries WHERE key = ?1",
                params![key],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let value: String = row.get(0)?;
        let expires_at: Option<i64> = row.get(1)?;

        match expires_at {
            Some(expires_at) if expires_at <= self.clock.now().timestamp_millis() => Ok(None),
            _ => Ok(Some(value)),
        }
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        let now = self.clock.now();
        let expires_at = ttl.map(|ttl| expiry_after(now, ttl).timestamp_millis());

        self.db
            .connection()
            .execute(
                "INSERT INTO cache_entries (key, value, expires_at, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at, updated_at = excluded.updated_at",
                params![key, value, expires_at, Utc::now().to_rfc3339()],
            )
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let now = self.clock.now().timestamp_millis();
        let removed = self
            .db
            .connection()
            .execute(
                "DELETE FROM cache_entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                params![now],
            )
            .await?;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired cache entries");
        }
        Ok(removed)
    }

    fn backend_name(&self) -> &'static str {
        "libsql"
    }
}

use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::error::Result;

use super::schema;

const BUSY_TIMEOUT_MS: u64 = 5000;

/// A libsql database with one shared connection.
///
/// A single connection is kept for the lifetime of the handle: `:memory:`
/// databases are per-connection, so reconnecting would lose the schema.
pub struct Database {
    _db: Arc<libsql::Database>,
    conn: Connection,
    remote: bool,
}

impl Database {
    /// Open `url`: `libsql://` or `https://` for a remote database,
    /// `:memory:`, or a local path (optionally prefixed with `file:`).
    pub async fn open(url: &str, auth_token: Option<&str>) -> Result<Self> {
        let remote = url.starts_with("libsql://") || url.starts_with("https://");
        let db = if remote {
            Builder::new_remote(url.to_string(), auth_token.unwrap_or_default().to_string())
                .build()
                .await?
        } else if url == ":memory:" {
            Builder::new_local(":memory:").build().await?
        } else {
            let path = url.strip_prefix("file:").unwrap_or(url);
            Builder::new_local(path).build().await?
        };

        let conn = db.connect()?;
        let database = Self {
            _db: Arc::new(db),
            conn,
            remote,
        };
        if !remote {
            database.configure_database().await;
        }
        schema::init_schema(&database.conn).await?;

        tracing::info!(remote, "Cache database ready");
        Ok(database)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    async fn configure_database(&self) {
        let pragmas = [
            format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"),
            "PRAGMA journal_mode = WAL".to_string(),
            "PRAGMA synchronous = NORMAL".to_string(),
        ];

        for pragma in pragmas {
            if let Err(error) = self.conn.execute_batch(&pragma).await {
                tracing::warn!(pragma = %pragma, error = %error, "Failed to apply SQLite pragma");
            }
        }
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            _db: Arc::clone(&self._db),
            conn: self.conn.clone(),
            remote: self.remote,
        }
    }
}

//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Trait for key/value cache backends with per-key expiry.
pub trait CacheStorage: Send + Sync {
  /// Get the value stored under `key`, if present and not expired.
  fn get(&self, key: &str) -> Result<Option<String>>;

  /// Store `value` under `key`, replacing any previous value, for `ttl`.
  fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

  /// Remove `key`. Removing an absent key is a no-op.
  fn delete(&self, key: &str) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Result<Option<String>> {
    Ok(None) // Always miss
  }

  fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
    Ok(()) // Discard
  }

  fn delete(&self, _key: &str) -> Result<()> {
    Ok(())
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open (or create) the cache database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Open a private in-memory cache that lives as long as this value.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;

    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;

    Ok(storage)
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- Key/value cache with absolute expiry (unix seconds)
CREATE TABLE IF NOT EXISTS kv_cache (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);
"#;

impl CacheStorage for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(String, i64)> = conn
      .query_row(
        "SELECT value, expires_at FROM kv_cache WHERE key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache entry {}: {}", key, e))?;

    match row {
      Some((value, expires_at)) if !is_expired(expires_at, Utc::now()) => Ok(Some(value)),
      Some(_) => {
        // Expired entries are purged lazily
        conn
          .execute("DELETE FROM kv_cache WHERE key = ?", params![key])
          .map_err(|e| eyre!("Failed to purge expired cache entry {}: {}", key, e))?;
        Ok(None)
      }
      None => Ok(None),
    }
  }

  fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let expires_at = Utc::now()
      .checked_add_signed(ttl)
      .ok_or_else(|| eyre!("Cache TTL out of range for entry {}", key))?
      .timestamp();

    conn
      .execute(
        "INSERT OR REPLACE INTO kv_cache (key, value, expires_at) VALUES (?, ?, ?)",
        params![key, value, expires_at],
      )
      .map_err(|e| eyre!("Failed to store cache entry {}: {}", key, e))?;

    Ok(())
  }

  fn delete(&self, key: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM kv_cache WHERE key = ?", params![key])
      .map_err(|e| eyre!("Failed to delete cache entry {}: {}", key, e))?;

    Ok(())
  }
}

/// An entry expiring at `expires_at` (unix seconds) is stale from that second on.
fn is_expired(expires_at: i64, now: DateTime<Utc>) -> bool {
  now.timestamp() >= expires_at
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_set_then_get() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.set("k", "v", Duration::hours(1)).unwrap();
    assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
  }

  #[test]
  fn test_get_missing_key() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    assert_eq!(storage.get("missing").unwrap(), None);
  }

  #[test]
  fn test_set_replaces_value() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.set("k", "old", Duration::hours(1)).unwrap();
    storage.set("k", "new", Duration::hours(1)).unwrap();
    assert_eq!(storage.get("k").unwrap(), Some("new".to_string()));
  }

  #[test]
  fn test_expired_entry_is_absent() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.set("k", "v", Duration::zero()).unwrap();
    assert_eq!(storage.get("k").unwrap(), None);

    let conn = storage.conn.lock().unwrap();
    let remaining: i64 = conn
      .query_row("SELECT COUNT(*) FROM kv_cache", [], |row| row.get(0))
      .unwrap();
    assert_eq!(remaining, 0);
  }

  #[test]
  fn test_delete_is_idempotent() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.set("k", "v", Duration::hours(1)).unwrap();
    storage.delete("k").unwrap();
    storage.delete("k").unwrap();
    assert_eq!(storage.get("k").unwrap(), None);
  }

  #[test]
  fn test_open_creates_parent_dirs_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("cache.db");

    {
      let storage = SqliteStorage::open(&path).unwrap();
      storage.set("k", "v", Duration::hours(1)).unwrap();
    }

    let reopened = SqliteStorage::open(&path).unwrap();
    assert_eq!(reopened.get("k").unwrap(), Some("v".to_string()));
  }

  #[test]
  fn test_noop_storage_always_misses() {
    let storage = NoopStorage;
    storage.set("k", "v", Duration::hours(1)).unwrap();
    assert_eq!(storage.get("k").unwrap(), None);
    storage.delete("k").unwrap();
  }

  #[test]
  fn test_set_with_unrepresentable_expiry_fails() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let ttl = Duration::try_days(1_000_000_000).unwrap();

    let err = storage.set("k", "v", ttl).unwrap_err();
    assert!(err.to_string().contains("out of range"));
    assert_eq!(storage.get("k").unwrap(), None);
  }

  #[test]
  fn test_is_expired_boundary() {
    let now = Utc::now();
    assert!(is_expired(now.timestamp(), now));
    assert!(!is_expired(now.timestamp() + 1, now));
  }
}

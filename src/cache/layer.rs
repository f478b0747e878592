//! Cache layer that stores typed lists as JSON on top of a storage backend.

use chrono::Duration;
use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::CacheStorage;

/// Cache layer that owns the time-to-live and the (de)serialization of entries.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  /// How long a stored entry stays valid
  ttl: Duration,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      ttl: Duration::hours(24),
    }
  }

  /// Set the time-to-live for entries written by this layer.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// Read a cached list.
  ///
  /// An entry that no longer decodes as `Vec<T>` is reported as a miss so the
  /// caller refetches and overwrites it.
  pub fn get_list<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
    let Some(raw) = self.storage.get(key)? else {
      debug!(key, "cache miss");
      return Ok(None);
    };

    match serde_json::from_str(&raw) {
      Ok(list) => {
        debug!(key, "cache hit");
        Ok(Some(list))
      }
      Err(e) => {
        warn!(key, error = %e, "discarding undecodable cache entry");
        self.storage.delete(key)?;
        Ok(None)
      }
    }
  }

  /// Store `items` under `key` unless an entry already exists.
  ///
  /// The existence check and the write are not atomic. Returns whether a write
  /// happened.
  pub fn store_list_if_absent<T: Serialize>(&self, key: &str, items: &[T]) -> Result<bool> {
    if self.storage.get(key)?.is_some() {
      debug!(key, "cache entry appeared concurrently, skipping write");
      return Ok(false);
    }

    let data =
      serde_json::to_string(items).map_err(|e| eyre!("Failed to serialize cache entry: {}", e))?;
    self.storage.set(key, &data, self.ttl)?;

    Ok(true)
  }

  /// Drop the entry under `key`.
  pub fn invalidate(&self, key: &str) -> Result<()> {
    self.storage.delete(key)
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      ttl: self.ttl,
    }
  }
}

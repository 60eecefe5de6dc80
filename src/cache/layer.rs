//! Cache layer that orchestrates cache-first reads with network fetching.

use chrono::{DateTime, Duration, Utc};
use color_eyre::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::key::{QueryKey, Segment};
use super::store::CacheStore;

/// Cache layer that manages cache lookups, staleness and invalidation.
///
/// This layer sits between the per-resource query bindings and the API
/// client. Reads are cache-first; mutations drive the cache through
/// `seed`, `invalidate` and `remove`.
pub struct CacheLayer<S: CacheStore> {
  store: Arc<S>,
  /// How long before cached data is considered stale
  stale_time: Duration,
}

impl<S: CacheStore> CacheLayer<S> {
  /// Create a new cache layer with the given store backend.
  pub fn new(store: S) -> Self {
    Self {
      store: Arc::new(store),
      stale_time: Duration::minutes(5),
    }
  }

  /// Set the stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Check if cached data is stale based on cached_at timestamp.
  fn is_expired(&self, cached_at: DateTime<Utc>) -> bool {
    Utc::now() - cached_at > self.stale_time
  }

  /// Fetch a value with cache-first strategy.
  ///
  /// 1. Check the store - if present, fresh and not invalidated, return it
  /// 2. Otherwise run the fetcher and write the result under `key`
  ///
  /// A fetcher failure propagates to the caller and leaves the cache
  /// untouched; the next read retries.
  pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    if let Some(entry) = self.store.get::<T>(&key)? {
      if !entry.stale && !self.is_expired(entry.cached_at) {
        debug!(key = %key, "cache hit");
        return Ok(entry.value);
      }
    }

    debug!(key = %key, "cache miss, fetching");
    let value = fetcher().await?;
    self.store.set(&key, &value)?;
    Ok(value)
  }

  /// Get the value under `key` if present and fresh, without fetching.
  pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<T>> {
    match self.store.get::<T>(key)? {
      Some(entry) if !entry.stale && !self.is_expired(entry.cached_at) => Ok(Some(entry.value)),
      _ => Ok(None),
    }
  }

  /// Write a known-correct value under `key` without fetching.
  pub fn seed<T: Serialize>(&self, key: &QueryKey, value: &T) -> Result<()> {
    debug!(key = %key, "seeding cache");
    self.store.set(key, value)
  }

  /// Mark every entry under `prefix` stale; the next read refetches.
  pub fn invalidate(&self, prefix: &[Segment]) -> Result<()> {
    debug!(?prefix, "invalidating cache prefix");
    self.store.invalidate_prefix(prefix)
  }

  /// Evict every entry under `prefix`.
  pub fn remove(&self, prefix: &[Segment]) -> Result<()> {
    debug!(?prefix, "removing cache prefix");
    self.store.remove_prefix(prefix)
  }
}

impl<S: CacheStore> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      stale_time: self.stale_time,
    }
  }
}

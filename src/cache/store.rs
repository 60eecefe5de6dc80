//! Cache store trait and in-memory implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use super::key::{QueryKey, Segment};

/// A cached value together with its bookkeeping.
#[derive(Debug, Clone)]
pub struct CachedEntry<T> {
  /// The cached value
  pub value: T,
  /// When the value was written
  pub cached_at: DateTime<Utc>,
  /// Whether the entry has been invalidated and must be refetched
  pub stale: bool,
}

/// Trait for cache store backends.
///
/// Entries live under ordered-tuple keys; `invalidate_prefix` and
/// `remove_prefix` apply to every key whose leading segments equal the
/// given prefix. Writes are idempotent overwrites, never merges.
pub trait CacheStore: Send + Sync {
  /// Get the entry under `key`, stale or not.
  fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<CachedEntry<T>>>;

  /// Write a value under `key`, replacing any previous entry.
  fn set<T: Serialize>(&self, key: &QueryKey, value: &T) -> Result<()>;

  /// Mark every entry under `prefix` stale.
  fn invalidate_prefix(&self, prefix: &[Segment]) -> Result<()>;

  /// Evict the entry under `key`.
  fn remove(&self, key: &QueryKey) -> Result<()>;

  /// Evict every entry under `prefix`.
  fn remove_prefix(&self, prefix: &[Segment]) -> Result<()>;
}

/// Store implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStore;

impl CacheStore for NoopStore {
  fn get<T: DeserializeOwned>(&self, _key: &QueryKey) -> Result<Option<CachedEntry<T>>> {
    Ok(None) // Always miss
  }

  fn set<T: Serialize>(&self, _key: &QueryKey, _value: &T) -> Result<()> {
    Ok(()) // Discard
  }

  fn invalidate_prefix(&self, _prefix: &[Segment]) -> Result<()> {
    Ok(())
  }

  fn remove(&self, _key: &QueryKey) -> Result<()> {
    Ok(())
  }

  fn remove_prefix(&self, _prefix: &[Segment]) -> Result<()> {
    Ok(())
  }
}

/// One stored entry; values are held serialized so the store stays
/// homogeneous across resource types.
struct StoredEntry {
  value: serde_json::Value,
  cached_at: DateTime<Utc>,
  stale: bool,
}

/// In-memory cache store with process lifetime.
///
/// Entries are created on first successful fetch, overwritten on seed,
/// marked stale on invalidation and evicted on removal. Nothing is
/// persisted; the cache dies with the process.
pub struct MemoryStore {
  entries: Mutex<HashMap<QueryKey, StoredEntry>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
    }
  }
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

impl CacheStore for MemoryStore {
  fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<CachedEntry<T>>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    match entries.get(key) {
      Some(stored) => {
        let value = serde_json::from_value(stored.value.clone())
          .map_err(|e| eyre!("Failed to deserialize cached value for {}: {}", key, e))?;
        Ok(Some(CachedEntry {
          value,
          cached_at: stored.cached_at,
          stale: stored.stale,
        }))
      }
      None => Ok(None),
    }
  }

  fn set<T: Serialize>(&self, key: &QueryKey, value: &T) -> Result<()> {
    let value = serde_json::to_value(value)
      .map_err(|e| eyre!("Failed to serialize value for {}: {}", key, e))?;

    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    entries.insert(
      key.clone(),
      StoredEntry {
        value,
        cached_at: Utc::now(),
        stale: false,
      },
    );

    Ok(())
  }

  fn invalidate_prefix(&self, prefix: &[Segment]) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    for (key, entry) in entries.iter_mut() {
      if key.starts_with(prefix) {
        entry.stale = true;
      }
    }

    Ok(())
  }

  fn remove(&self, key: &QueryKey) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    entries.remove(key);
    Ok(())
  }

  fn remove_prefix(&self, prefix: &[Segment]) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    entries.retain(|key, _| !key.starts_with(prefix));
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn set_then_get_roundtrips() {
    let store = MemoryStore::new();
    let key = QueryKey::root("domains").push("all");

    store.set(&key, &vec!["a.com", "b.com"]).unwrap();

    let entry = store.get::<Vec<String>>(&key).unwrap().unwrap();
    assert_eq!(entry.value, vec!["a.com", "b.com"]);
    assert!(!entry.stale);
  }

  #[test]
  fn set_overwrites_existing_entry() {
    let store = MemoryStore::new();
    let key = QueryKey::root("domains").push("detail").push(1u64);

    store.set(&key, &"old").unwrap();
    store.invalidate_prefix(&[Segment::from("domains")]).unwrap();
    store.set(&key, &"new").unwrap();

    let entry = store.get::<String>(&key).unwrap().unwrap();
    assert_eq!(entry.value, "new");
    // Overwriting clears staleness
    assert!(!entry.stale);
  }

  #[test]
  fn invalidate_prefix_only_touches_matching_keys() {
    let store = MemoryStore::new();
    let domains = QueryKey::root("domains").push("all");
    let types = QueryKey::root("types").push("all");

    store.set(&domains, &1).unwrap();
    store.set(&types, &2).unwrap();
    store.invalidate_prefix(&[Segment::from("domains")]).unwrap();

    assert!(store.get::<i32>(&domains).unwrap().unwrap().stale);
    assert!(!store.get::<i32>(&types).unwrap().unwrap().stale);
  }

  #[test]
  fn remove_prefix_evicts_subtree() {
    let store = MemoryStore::new();
    let detail = QueryKey::root("domains").push("detail").push(5u64);
    let records = QueryKey::root("domains").push("detail").push(5u64).push("records");
    let other = QueryKey::root("domains").push("detail").push(6u64);

    store.set(&detail, &1).unwrap();
    store.set(&records, &2).unwrap();
    store.set(&other, &3).unwrap();

    store
      .remove_prefix(detail.segments())
      .unwrap();

    assert!(store.get::<i32>(&detail).unwrap().is_none());
    assert!(store.get::<i32>(&records).unwrap().is_none());
    assert!(store.get::<i32>(&other).unwrap().is_some());
  }

  #[test]
  fn remove_evicts_exact_key_only() {
    let store = MemoryStore::new();
    let detail = QueryKey::root("domains").push("detail").push(5u64);
    let records = QueryKey::root("domains").push("detail").push(5u64).push("records");

    store.set(&detail, &1).unwrap();
    store.set(&records, &2).unwrap();
    store.remove(&detail).unwrap();

    assert!(store.get::<i32>(&detail).unwrap().is_none());
    assert!(store.get::<i32>(&records).unwrap().is_some());
  }

  #[test]
  fn noop_store_always_misses() {
    let store = NoopStore;
    let key = QueryKey::root("domains").push("all");

    store.set(&key, &vec![1, 2, 3]).unwrap();
    assert!(store.get::<Vec<i32>>(&key).unwrap().is_none());
  }
}

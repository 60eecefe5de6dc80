//! Cache-managed queries for the instance type catalogue.

use chrono::Duration;
use color_eyre::Result;

use crate::api::{fetch_all, ApiClient, InstanceType};
use crate::cache::{CacheLayer, CacheStore, QueryKey};

pub const RESOURCE: &str = "types";

/// Instance type reads. The catalogue changes rarely, so entries get a
/// much longer stale time than other resources.
pub struct TypeQueries<S: CacheStore> {
  api: ApiClient,
  cache: CacheLayer<S>,
}

impl<S: CacheStore> TypeQueries<S> {
  pub fn new(api: ApiClient, cache: CacheLayer<S>) -> Self {
    Self {
      api,
      cache: cache.with_stale_time(Duration::hours(24)),
    }
  }

  fn all_key() -> QueryKey {
    QueryKey::root(RESOURCE).push("all")
  }

  fn detail_key(id: &str) -> QueryKey {
    QueryKey::root(RESOURCE).push("detail").push(id)
  }

  /// The full instance type catalogue, aggregated across pages.
  pub async fn all(&self) -> Result<Vec<InstanceType>> {
    self
      .cache
      .fetch(Self::all_key(), || {
        fetch_all(|params| self.api.get_types(params))
      })
      .await
  }

  /// A single instance type by id, cached under its own detail key.
  pub async fn get(&self, id: &str) -> Result<InstanceType> {
    self
      .cache
      .fetch(Self::detail_key(id), || self.lookup(id))
      .await
  }

  /// Look up several types by id.
  ///
  /// Some instances carry types the catalogue endpoint no longer returns
  /// ("shadow plans"); those still resolve through the dedicated
  /// single-type endpoint.
  pub async fn specific(&self, ids: &[String]) -> Result<Vec<InstanceType>> {
    let mut types = Vec::with_capacity(ids.len());
    for id in ids {
      types.push(self.get(id).await?);
    }
    Ok(types)
  }

  /// Two-tier lookup: a populated catalogue cache answers by id before the
  /// single-type endpoint is asked.
  async fn lookup(&self, id: &str) -> Result<InstanceType> {
    if let Some(all) = self.cache.peek::<Vec<InstanceType>>(&Self::all_key())? {
      if let Some(found) = all.into_iter().find(|t| t.id == id) {
        return Ok(found);
      }
    }

    self.api.get_type(id).await
  }
}

impl<S: CacheStore> Clone for TypeQueries<S> {
  fn clone(&self) -> Self {
    Self {
      api: self.api.clone(),
      cache: self.cache.clone(),
    }
  }
}

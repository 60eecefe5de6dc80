//! Event-driven bulk cache invalidation.
//!
//! The server publishes change notifications for account activity. Rather
//! than mapping each event to the exact keys it touches, any event that
//! concerns a cached resource marks that resource's entire key space
//! stale. The extra refetches are cheap next to the bookkeeping a precise
//! mapping would need.

use color_eyre::Result;
use serde::Deserialize;
use tracing::debug;

use crate::cache::{CacheLayer, CacheStore, Segment};

use super::domains;

/// Actions carried by change notifications that affect cached data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
  DomainCreate,
  DomainUpdate,
  DomainDelete,
  DomainRecordCreate,
  DomainRecordUpdate,
  DomainRecordDelete,
  /// Any action this client doesn't track
  #[serde(other)]
  Other,
}

/// Entity a change notification refers to.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEntity {
  pub id: u64,
  #[serde(default)]
  pub label: Option<String>,
}

/// A change notification from the server's event stream.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEvent {
  pub action: EventAction,
  #[serde(default)]
  pub entity: Option<EventEntity>,
}

/// The resource whose key space an action invalidates, if any.
fn invalidation_target(action: EventAction) -> Option<&'static str> {
  match action {
    EventAction::DomainCreate
    | EventAction::DomainUpdate
    | EventAction::DomainDelete
    | EventAction::DomainRecordCreate
    | EventAction::DomainRecordUpdate
    | EventAction::DomainRecordDelete => Some(domains::RESOURCE),
    EventAction::Other => None,
  }
}

/// Routes change notifications to cache invalidations.
pub struct EventRouter<S: CacheStore> {
  cache: CacheLayer<S>,
}

impl<S: CacheStore> EventRouter<S> {
  pub fn new(cache: CacheLayer<S>) -> Self {
    Self { cache }
  }

  /// Apply the invalidation an event calls for, if any.
  pub fn handle(&self, event: &ChangeEvent) -> Result<()> {
    let Some(resource) = invalidation_target(event.action) else {
      return Ok(());
    };

    debug!(action = ?event.action, resource, "invalidating on change event");
    self.cache.invalidate(&[Segment::from(resource)])
  }
}

impl<S: CacheStore> Clone for EventRouter<S> {
  fn clone(&self) -> Self {
    Self {
      cache: self.cache.clone(),
    }
  }
}

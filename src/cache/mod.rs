//! Client-side query cache keyed by ordered tuples.
//!
//! This module provides a resource-agnostic caching mechanism that:
//! - Addresses entries by composite keys (`[resource, variant, ...params]`)
//! - Invalidates and evicts by key prefix
//! - Supports direct seeding of known-correct values after mutations
//! - Tracks staleness so invalidated entries refetch on next access

mod key;
mod layer;
mod store;

pub use key::{QueryKey, Segment};
pub use layer::CacheLayer;
pub use store::{CacheStore, CachedEntry, MemoryStore, NoopStore};

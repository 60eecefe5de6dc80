//! Cache-managed data fetching for a cloud API console.
//!
//! Wraps the REST API's domain and instance-type resources with a
//! client-side query cache: reads are cache-first under ordered-tuple
//! keys, mutations invalidate or seed the affected entries on success,
//! and server change notifications trigger coarse per-resource
//! invalidation.

pub mod api;
pub mod cache;
pub mod config;
pub mod queries;

//! Cache-managed queries per API resource.
//!
//! Each resource module pairs cache-first reads (keyed by query) with
//! mutations that invalidate or seed the affected cache entries on
//! success; `events` feeds server change notifications back into the
//! cache as coarse invalidations.

pub mod domains;
pub mod events;
pub mod types;

pub use domains::DomainQueries;
pub use events::{ChangeEvent, EventAction, EventEntity, EventRouter};
pub use types::TypeQueries;

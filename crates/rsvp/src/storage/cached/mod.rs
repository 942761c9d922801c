//! Cached store decorator.
//!
//! Wraps any [`rsvp_core::storage::AttendanceStore`] with TTL caches on the
//! hot read paths:
//!
//! - **Reads**: served from the cache while fresh, refreshed from the store otherwise
//! - **Writes**: persisted to the store first, then the affected cache is cleared or re-seeded

mod store;

pub use store::{CacheTtls, CachedAttendanceStore};

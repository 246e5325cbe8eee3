//! shelf-cache: two-tier read-through page cache
//!
//! Tier 1 is process-local; tier 2 is a persisted session store behind
//! the [`session::SessionStore`] trait. Entries are keyed by the query
//! signature from `shelf-core` and governed by a single TTL freshness
//! rule with per-scope all-or-nothing invalidation.

pub mod layer;
pub mod session;

pub use layer::{CacheConfig, CacheEntry, CacheLayer};
pub use session::{MemorySessionStore, SessionStore, SessionStoreError};

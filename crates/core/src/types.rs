//! Core types for rank-ordered collections
//!
//! This module defines the foundational types:
//! - ScopeId: tenant boundary within which ordering and caching are partitioned
//! - ItemId: opaque stable identifier, unique within a scope
//! - RankKey: integer defining total order of items within a scope
//! - Timestamp: microsecond timestamp used for cache freshness and display
//! - Ranked: the capability trait all catalog entities share

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

/// Integer rank defining total order within a scope.
///
/// Rank keys are non-negative and not required to be contiguous.
/// Ties are broken by `ItemId` for determinism.
pub type RankKey = u64;

/// Tenant (restaurant) identifier.
///
/// Ordering and caching are partitioned per scope: a reorder or an
/// invalidation in one scope never touches another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(String);

impl ScopeId {
    /// Create a scope id from its remote representation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw string form, as stored remotely
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScopeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque stable identifier for a record, unique within its scope.
///
/// Ids are assigned by the remote store and never reused. They provide
/// the deterministic tie-break when two records share a rank key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Create an item id from its remote representation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw string form, as stored remotely
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Microseconds since the Unix epoch.
///
/// Used for cache freshness decisions and display timestamps. Never used
/// for ordering records; that is `RankKey`'s job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from microseconds since the epoch
    pub fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Microseconds since the epoch
    pub fn as_micros(&self) -> u64 {
        self.0
    }

    /// Microseconds elapsed since `earlier`, saturating at zero
    /// if `earlier` is in the future.
    pub fn micros_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Whether less than `ttl` has elapsed between `earlier` and this
    /// timestamp. This is the single freshness rule used by the cache.
    pub fn within(&self, earlier: Timestamp, ttl: Duration) -> bool {
        u128::from(self.micros_since(earlier)) < ttl.as_micros()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// A single rank-key reassignment, as persisted to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankUpdate {
    /// Record to update
    pub id: ItemId,
    /// New rank key for that record
    pub rank_key: RankKey,
}

/// Capability shared by all catalog entities that participate in
/// rank-ordered collections (categories, products, ...).
///
/// The sync engine is generic over this trait: one implementation of the
/// store, planner, and cache serves every entity type instead of a
/// per-entity copy.
pub trait Ranked: Clone + Send + Sync + 'static {
    /// Stable identifier, unique within the scope
    fn id(&self) -> &ItemId;

    /// Owning scope
    fn scope_id(&self) -> &ScopeId;

    /// Current rank key
    fn rank_key(&self) -> RankKey;

    /// Replace the rank key (used when applying a reorder locally)
    fn set_rank_key(&mut self, rank: RankKey);

    /// Whether the record is in its active/visible state
    fn is_active(&self) -> bool;

    /// Whether the record matches an entity-specific status or
    /// category filter (e.g. "active", "out-of-stock", a category id).
    fn matches_filter(&self, filter: &str) -> bool;

    /// Text fields that participate in substring search
    /// (typically name, description, code).
    fn search_fields(&self) -> Vec<&str>;

    /// Last-modified timestamp. Display only; never ordering.
    fn updated_at(&self) -> Timestamp;
}

/// Authoritative display order: `(rank_key, id)` ascending.
///
/// For a fixed scope, sorting all items with this comparator yields the
/// order the remote store serves and the view renders.
pub fn display_order<R: Ranked>(a: &R, b: &R) -> Ordering {
    a.rank_key()
        .cmp(&b.rank_key())
        .then_with(|| a.id().cmp(b.id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Row {
        id: ItemId,
        scope: ScopeId,
        rank: RankKey,
    }

    impl Ranked for Row {
        fn id(&self) -> &ItemId {
            &self.id
        }
        fn scope_id(&self) -> &ScopeId {
            &self.scope
        }
        fn rank_key(&self) -> RankKey {
            self.rank
        }
        fn set_rank_key(&mut self, rank: RankKey) {
            self.rank = rank;
        }
        fn is_active(&self) -> bool {
            true
        }
        fn matches_filter(&self, _filter: &str) -> bool {
            true
        }
        fn search_fields(&self) -> Vec<&str> {
            vec![]
        }
        fn updated_at(&self) -> Timestamp {
            Timestamp::default()
        }
    }

    fn row(id: &str, rank: RankKey) -> Row {
        Row {
            id: ItemId::new(id),
            scope: ScopeId::new("s1"),
            rank,
        }
    }

    #[test]
    fn test_display_order_by_rank() {
        let a = row("a", 5);
        let b = row("b", 2);
        assert_eq!(display_order(&a, &b), Ordering::Greater);
        assert_eq!(display_order(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_display_order_ties_break_by_id() {
        let a = row("a", 3);
        let b = row("b", 3);
        assert_eq!(display_order(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_timestamp_within_ttl() {
        let earlier = Timestamp::from_micros(1_000_000);
        let now = Timestamp::from_micros(1_500_000);
        assert!(now.within(earlier, Duration::from_secs(1)));
        assert!(!now.within(earlier, Duration::from_micros(500_000)));
    }

    #[test]
    fn test_timestamp_micros_since_saturates() {
        let earlier = Timestamp::from_micros(2_000);
        let now = Timestamp::from_micros(1_000);
        assert_eq!(now.micros_since(earlier), 0);
    }

    #[test]
    fn test_item_id_display_roundtrip() {
        let id = ItemId::new("prod-42");
        assert_eq!(id.to_string(), "prod-42");
        assert_eq!(id.as_str(), "prod-42");
    }
}

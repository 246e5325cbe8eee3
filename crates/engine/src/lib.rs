//! shelf-engine: ordered-collection sync engine
//!
//! Keeps a paginated, searchable, drag-reorderable list of records in
//! sync between a remote store, the two-tier cache, and a push change
//! feed, with minimal-cost rank renumbering for cross-page drags.
//!
//! # Architecture
//!
//! - [`remote::RemoteAdapter`] — the authoritative backing store
//! - [`store::CollectionStore`] — materialized view of the current page
//! - [`planner`] — pure subrange-renumbering algorithm
//! - [`feed::FeedListener`] — folds push notifications into the store
//! - [`drag::DragController`] — gesture orchestration, cross-page paging
//!
//! Reads flow top-down (store asks cache, cache asks adapter on miss);
//! writes and events flow bottom-up through the store's entry points.

pub mod drag;
pub mod feed;
pub mod planner;
pub mod remote;
pub mod store;
pub mod testing;

pub use drag::{DragConfig, DragController, PageNav};
pub use feed::{ChangeFeed, FeedListener, Subscription};
pub use planner::{apply_plan, plan_move, plan_move_to_edge, PageEdge, Placement};
pub use remote::RemoteAdapter;
pub use store::{CollectionStore, RecordEvent, ViewSnapshot};

// Re-export the foundation so downstream crates depend on one surface.
pub use shelf_cache::{
    CacheConfig, CacheEntry, CacheLayer, MemorySessionStore, SessionStore, SessionStoreError,
};
pub use shelf_core::{
    display_order, Clock, Error, ItemId, ManualClock, Page, PageRequest, RankKey, RankUpdate,
    Ranked, Result, ScopeId, Signature, SystemClock, Timestamp,
};

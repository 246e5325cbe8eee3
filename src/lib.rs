//! Shelf - client-side sync engine for rank-ordered catalog collections
//!
//! Shelf keeps a paginated, searchable, drag-reorderable list of records
//! in sync between a remote relational store, a two-tier cache, and a
//! push-based change feed, with minimal-cost rank renumbering for
//! cross-page drag-and-drop.
//!
//! # Quick Start
//!
//! ```ignore
//! use shelf::{
//!     CacheLayer, CollectionStore, DragController, MemorySessionStore,
//!     PageRequest, ScopeId, SystemClock,
//! };
//! use std::sync::Arc;
//!
//! let clock = Arc::new(SystemClock);
//! let cache = Arc::new(CacheLayer::new(clock.clone(), Arc::new(MemorySessionStore::new())));
//! let store = Arc::new(CollectionStore::new(adapter, cache));
//!
//! store.load(PageRequest::new(ScopeId::new("rest-1"), 0, 25))?;
//! let view = store.snapshot();
//! ```
//!
//! # Architecture
//!
//! The remote store is authoritative; everything held locally is a
//! volatile copy refreshed through the [`CollectionStore`]'s entry
//! points. The change-feed listener and the drag controller are the only
//! external mutators, and both go through the store.

// Re-export the public API from shelf-engine
pub use shelf_engine::*;

//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from any test file.

#![allow(dead_code)]

use shelf::testing::{MemoryFeed, MemoryRemote, MenuItem};
use shelf::{
    CacheLayer, CollectionStore, ManualClock, MemorySessionStore, PageRequest, Ranked, ScopeId,
};
use std::sync::Arc;

/// Everything a sync scenario needs, wired the way production wires it.
pub struct TestRig {
    pub clock: Arc<ManualClock>,
    pub session: Arc<MemorySessionStore>,
    pub remote: Arc<MemoryRemote>,
    pub store: Arc<CollectionStore<MemoryRemote>>,
    pub feed: Arc<MemoryFeed>,
}

impl TestRig {
    /// Rig over a seeded backend.
    pub fn seeded(rows: Vec<MenuItem>) -> Self {
        let clock = Arc::new(ManualClock::new());
        let session = Arc::new(MemorySessionStore::new());
        let remote = Arc::new(MemoryRemote::seeded(rows));
        let cache = Arc::new(CacheLayer::new(clock.clone(), session.clone()));
        let store = Arc::new(CollectionStore::new(remote.clone(), cache));
        TestRig {
            clock,
            session,
            remote,
            store,
            feed: Arc::new(MemoryFeed::new()),
        }
    }

    /// Rig over an empty backend.
    pub fn empty() -> Self {
        Self::seeded(Vec::new())
    }
}

pub fn scope() -> ScopeId {
    ScopeId::new("rest-1")
}

/// `count` items named item-00.. with contiguous ranks.
pub fn catalog(count: usize) -> Vec<MenuItem> {
    (0..count)
        .map(|i| MenuItem::new(format!("item-{i:02}"), scope(), i as u64))
        .collect()
}

pub fn request(page: u32, page_size: u32) -> PageRequest {
    PageRequest::new(scope(), page, page_size)
}

/// Ids of a record list, in order.
pub fn ids<R: Ranked>(items: &[R]) -> Vec<String> {
    items.iter().map(|i| i.id().to_string()).collect()
}

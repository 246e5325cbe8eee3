//! Remote store adapter
//!
//! The remote relational store is authoritative for every record. This
//! trait is the only way records are created or mutated; everything the
//! engine holds locally is a volatile, possibly-stale copy.
//!
//! Implementations wrap whatever transport the deployment uses (a hosted
//! data backend, an HTTP API). The engine only assumes the read/write
//! capabilities documented here.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shelf_core::{ItemId, Page, PageRequest, RankUpdate, Ranked, Result, ScopeId};

/// Adapter over the backing store for one entity type (table)
///
/// Thread safety: methods must be safe to call from multiple threads
/// (`Send + Sync`); the engine shares the adapter behind an `Arc`.
pub trait RemoteAdapter: Send + Sync {
    /// Entity type this adapter serves
    type Record: Ranked + Serialize + DeserializeOwned;

    /// Partial field set accepted by [`RemoteAdapter::update`]
    type Patch: Send;

    /// Fetch one page of a scope's collection
    ///
    /// Items come back sorted by `(rank_key, id)` ascending. The search
    /// term matches case-insensitively as a substring over the record's
    /// search fields; the filter restricts by entity-specific status or
    /// category. `total_count` is the exact match count for the whole
    /// query, not just this page.
    ///
    /// # Errors
    ///
    /// `Error::Remote` on network/store failure. Callers treat this as
    /// non-fatal and keep their last-known state.
    fn fetch_page(&self, request: &PageRequest) -> Result<Page<Self::Record>>;

    /// Fetch the full ordered list of a scope
    ///
    /// This is the reorder planner's required input: all items of the
    /// scope, not just the current page. The default implementation
    /// issues a single maximal page.
    ///
    /// # Errors
    ///
    /// `Error::Remote` on network/store failure.
    fn fetch_scope(&self, scope: &ScopeId) -> Result<Vec<Self::Record>> {
        let request = PageRequest::new(scope.clone(), 0, u32::MAX);
        Ok(self.fetch_page(&request)?.items)
    }

    /// Apply rank-key reassignments, one row at a time
    ///
    /// No atomic multi-row transaction is assumed: updates are applied
    /// sequentially and abandoned at the first failure. After a partial
    /// failure the caller must treat the scope's order as potentially
    /// inconsistent and reload it authoritatively rather than attempting
    /// a compensating diff.
    ///
    /// # Errors
    ///
    /// `Error::Remote` at the first row that fails; later rows are not
    /// attempted.
    fn persist_rank_keys(&self, scope: &ScopeId, updates: &[RankUpdate]) -> Result<()>;

    /// Insert a new record; the server assigns the id
    ///
    /// The caller-provided rank key is ignored: the store assigns
    /// `max(existing rank keys in scope) + 1` so new records land at the
    /// end of the order.
    ///
    /// # Errors
    ///
    /// `Error::Remote` on network/store failure.
    fn insert(&self, record: Self::Record) -> Result<ItemId>;

    /// Update a record's fields by id
    ///
    /// # Errors
    ///
    /// `Error::NotFound` if the id does not exist, `Error::Remote` on
    /// transport failure.
    fn update(&self, id: &ItemId, patch: Self::Patch) -> Result<()>;

    /// Delete a record by id
    ///
    /// # Errors
    ///
    /// `Error::NotFound` if the id does not exist, `Error::Remote` on
    /// transport failure.
    fn delete(&self, id: &ItemId) -> Result<()>;
}

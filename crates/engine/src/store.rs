//! Ordered-collection store: the materialized view of one query
//!
//! ## Design
//!
//! The store composes the cache layer and the remote adapter into an
//! in-memory materialized view of "the current page of the current
//! query". It owns all merge and resort logic; the change-feed listener
//! and the drag controller mutate the view only through its documented
//! entry points, never by touching cache entries or the item list
//! directly.
//!
//! Mutations follow a single discipline: call the adapter, invalidate
//! the scope's cache, reload the viewed page. On failure the previously
//! materialized list is left untouched (stale but consistent), never
//! cleared. Reorders additionally apply the planned arrangement
//! optimistically before persisting; any persistence failure discards
//! the optimistic state in favor of a full authoritative reload rather
//! than a targeted rollback.

use crate::planner::{self, PageEdge, Placement};
use crate::remote::RemoteAdapter;
use parking_lot::RwLock;
use shelf_cache::CacheLayer;
use shelf_core::{display_order, Error, ItemId, PageRequest, RankUpdate, Ranked, Result, ScopeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tagged change-feed event union for one entity type
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent<R> {
    /// A record was created remotely
    Inserted(R),
    /// A record's fields (possibly including its rank key) changed
    Updated(R),
    /// A record was deleted remotely
    Deleted(R),
}

impl<R: Ranked> RecordEvent<R> {
    /// The record the event carries
    pub fn record(&self) -> &R {
        match self {
            RecordEvent::Inserted(r) | RecordEvent::Updated(r) | RecordEvent::Deleted(r) => r,
        }
    }

    /// Scope the event belongs to
    pub fn scope_id(&self) -> &ScopeId {
        self.record().scope_id()
    }
}

/// A rendering-ready copy of the materialized view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot<R> {
    /// Records of the current page, in display order
    pub items: Vec<R>,
    /// Exact match count for the current query across all pages
    pub total_count: usize,
}

struct ViewState<R> {
    request: Option<PageRequest>,
    items: Vec<R>,
    total_count: usize,
}

impl<R> Default for ViewState<R> {
    fn default() -> Self {
        Self {
            request: None,
            items: Vec::new(),
            total_count: 0,
        }
    }
}

/// Materialized view of one scope's ordered collection
///
/// Generic over the remote adapter, so one implementation serves every
/// entity type. Shared behind an `Arc` by the feed listener and the
/// drag controller; interior mutability keeps all entry points `&self`.
pub struct CollectionStore<A: RemoteAdapter> {
    adapter: Arc<A>,
    cache: Arc<CacheLayer<A::Record>>,
    state: RwLock<ViewState<A::Record>>,
    // Bumped on scope change; in-flight prefetches check it before
    // storing so a late result for an abandoned scope is discarded.
    generation: AtomicU64,
}

impl<A: RemoteAdapter> CollectionStore<A> {
    /// Create a store over an adapter and cache
    pub fn new(adapter: Arc<A>, cache: Arc<CacheLayer<A::Record>>) -> Self {
        Self {
            adapter,
            cache,
            state: RwLock::new(ViewState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// The query currently materialized, if any
    pub fn current_request(&self) -> Option<PageRequest> {
        self.state.read().request.clone()
    }

    /// Whether a non-empty search term is active on the current query
    pub fn search_active(&self) -> bool {
        self.state
            .read()
            .request
            .as_ref()
            .map(|r| r.has_search())
            .unwrap_or(false)
    }

    /// Copy of the materialized page for rendering
    pub fn snapshot(&self) -> ViewSnapshot<A::Record> {
        let state = self.state.read();
        ViewSnapshot {
            items: state.items.clone(),
            total_count: state.total_count,
        }
    }

    /// Load a page: cache read-through, write-back on miss, materialize
    ///
    /// Changing scope discards the previous scope's view and abandons
    /// its in-flight prefetches. After a successful load of an
    /// unfiltered, unsearched page, the next page (when one exists) is
    /// prefetched into the local cache tier.
    ///
    /// # Errors
    ///
    /// `Error::Remote` when the fetch fails; the previously materialized
    /// list is kept as last-known-good, never cleared.
    pub fn load(&self, request: PageRequest) -> Result<()> {
        let generation = self.note_scope(&request.scope);

        let signature = request.signature();
        let page = match self.cache.read(&signature) {
            Some(entry) => (entry.items, entry.total_count),
            None => {
                let fetched = self.adapter.fetch_page(&request)?;
                self.cache
                    .write(&signature, fetched.items.clone(), fetched.total_count);
                (fetched.items, fetched.total_count)
            }
        };

        {
            let mut state = self.state.write();
            state.request = Some(request.clone());
            state.items = page.0;
            state.total_count = page.1;
        }
        debug!(
            target: "shelf::store",
            scope = %request.scope,
            page = request.page,
            total = self.state.read().total_count,
            "page materialized"
        );

        self.maybe_prefetch(&request, generation);
        Ok(())
    }

    /// Fold a change-feed event into the view
    ///
    /// Events for other scopes are ignored. The merge is idempotent:
    /// re-applying an identical `Inserted` or `Updated` event is a no-op
    /// beyond the first application, and a `Deleted` event for an absent
    /// id does nothing. Any event for the current scope invalidates the
    /// scope's cache, since every cached page of the scope may be stale.
    pub fn apply_remote_event(&self, event: RecordEvent<A::Record>) {
        let scope = match self.current_request() {
            Some(request) if request.scope == *event.scope_id() => request.scope,
            _ => return,
        };

        {
            let mut state = self.state.write();
            match event {
                RecordEvent::Inserted(record) => {
                    if state.items.iter().any(|i| i.id() == record.id()) {
                        debug!(target: "shelf::store", id = %record.id(), "duplicate insert event ignored");
                    } else {
                        state.items.push(record);
                        state.items.sort_by(display_order);
                        state.total_count += 1;
                    }
                }
                RecordEvent::Updated(record) => {
                    if let Some(existing) =
                        state.items.iter_mut().find(|i| i.id() == record.id())
                    {
                        *existing = record;
                        state.items.sort_by(display_order);
                    }
                }
                RecordEvent::Deleted(record) => {
                    let before = state.items.len();
                    state.items.retain(|i| i.id() != record.id());
                    if state.items.len() < before {
                        state.total_count -= 1;
                    }
                }
            }
        }

        self.cache.invalidate_scope(&scope);
    }

    /// Create a record remotely, then refresh the view
    ///
    /// # Errors
    ///
    /// Surfaces the adapter error; on failure the materialized list is
    /// left untouched.
    pub fn create(&self, record: A::Record) -> Result<ItemId> {
        let id = self.adapter.insert(record)?;
        info!(target: "shelf::store", %id, "record created");
        self.refresh_after_mutation()?;
        Ok(id)
    }

    /// Update a record's fields remotely, then refresh the view
    ///
    /// # Errors
    ///
    /// Surfaces the adapter error; on failure the materialized list is
    /// left untouched.
    pub fn update_record(&self, id: &ItemId, patch: A::Patch) -> Result<()> {
        self.adapter.update(id, patch)?;
        info!(target: "shelf::store", %id, "record updated");
        self.refresh_after_mutation()
    }

    /// Delete a record remotely, then refresh the view
    ///
    /// # Errors
    ///
    /// Surfaces the adapter error; on failure the materialized list is
    /// left untouched.
    pub fn delete_record(&self, id: &ItemId) -> Result<()> {
        self.adapter.delete(id)?;
        info!(target: "shelf::store", %id, "record deleted");
        self.refresh_after_mutation()
    }

    /// Commit a drag gesture: drop `dragged` onto `target`
    ///
    /// Plans against the scope's full authoritative order, applies the
    /// arrangement optimistically to the view, then persists the rank
    /// reassignments. Success invalidates the scope and reloads the
    /// viewed page; any failure discards the optimistic state and forces
    /// an authoritative reload.
    ///
    /// # Errors
    ///
    /// `Error::ReorderDisabled` while a search is active,
    /// `Error::StaleReference` when either id has disappeared (the view
    /// is reloaded before this returns), `Error::Remote` when fetching
    /// or persisting fails.
    pub fn reorder(&self, dragged: &ItemId, target: &ItemId, placement: Placement) -> Result<()> {
        self.commit_reorder(dragged, |full_order| {
            planner::plan_move(full_order, dragged, target, placement)
        })
    }

    /// Commit a drag gesture onto a page-edge sentinel
    ///
    /// The first (start) or last (end) currently displayed item acts as
    /// the virtual target.
    ///
    /// # Errors
    ///
    /// As for [`CollectionStore::reorder`].
    pub fn reorder_to_edge(&self, dragged: &ItemId, edge: PageEdge) -> Result<()> {
        let edge_item = {
            let state = self.state.read();
            let item = match edge {
                PageEdge::Start => state.items.first(),
                PageEdge::End => state.items.last(),
            };
            match item {
                Some(item) => item.id().clone(),
                None => return Ok(()),
            }
        };
        self.commit_reorder(dragged, |full_order| {
            planner::plan_move_to_edge(full_order, dragged, &edge_item, edge)
        })
    }

    fn commit_reorder<F>(&self, dragged: &ItemId, plan: F) -> Result<()>
    where
        F: FnOnce(&[A::Record]) -> Result<Vec<RankUpdate>>,
    {
        let request = self
            .current_request()
            .ok_or_else(|| Error::InvalidRequest("no page loaded".to_string()))?;
        if request.has_search() {
            return Err(Error::ReorderDisabled);
        }

        let full_order = self.adapter.fetch_scope(&request.scope)?;
        let updates = match plan(&full_order) {
            Ok(updates) => updates,
            Err(e) => {
                // A stale gesture must not silently hide the
                // inconsistency: reload the authoritative order first.
                warn!(target: "shelf::store", error = %e, "reorder aborted, reloading");
                self.cache.invalidate_scope(&request.scope);
                let _ = self.load(request);
                return Err(e);
            }
        };
        if updates.is_empty() {
            return Ok(());
        }

        let prior_items = {
            let mut state = self.state.write();
            let prior = state.items.clone();
            planner::apply_plan(&mut state.items, &updates);
            prior
        };
        debug!(
            target: "shelf::store",
            %dragged,
            count = updates.len(),
            "optimistic reorder applied"
        );

        match self.adapter.persist_rank_keys(&request.scope, &updates) {
            Ok(()) => {
                self.cache.invalidate_scope(&request.scope);
                self.load(request)
            }
            Err(e) => {
                // Partial writes may have landed; the scope's order is
                // suspect. Discard the optimistic state and re-fetch.
                warn!(target: "shelf::store", error = %e, "rank persistence failed, reloading authoritative order");
                self.state.write().items = prior_items;
                self.cache.invalidate_scope(&request.scope);
                let _ = self.load(request);
                Err(e)
            }
        }
    }

    fn refresh_after_mutation(&self) -> Result<()> {
        match self.current_request() {
            Some(request) => {
                self.cache.invalidate_scope(&request.scope);
                self.load(request)
            }
            None => Ok(()),
        }
    }

    /// Record the viewed scope, discarding state on a scope change.
    /// Returns the generation current prefetches must present.
    fn note_scope(&self, scope: &ScopeId) -> u64 {
        let changed = {
            let state = self.state.read();
            state
                .request
                .as_ref()
                .map(|r| r.scope != *scope)
                .unwrap_or(false)
        };
        if changed {
            let mut state = self.state.write();
            *state = ViewState::default();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            info!(target: "shelf::store", %scope, "scope changed, view discarded");
            generation
        } else {
            self.generation.load(Ordering::SeqCst)
        }
    }

    #[cfg(test)]
    pub(crate) fn generation_for_tests(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn maybe_prefetch(&self, request: &PageRequest, generation: u64) {
        if request.filter.is_some() || request.has_search() {
            return;
        }
        let total_count = self.state.read().total_count;
        if !request.has_next_page(total_count) {
            return;
        }

        let next = request.at_page(request.page + 1);
        let signature = next.signature();
        self.cache.prefetch(&signature, || {
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!(target: "shelf::store", "prefetch abandoned, scope changed");
                return None;
            }
            match self.adapter.fetch_page(&next) {
                Ok(page) => {
                    if self.generation.load(Ordering::SeqCst) != generation {
                        debug!(target: "shelf::store", "late prefetch result discarded");
                        return None;
                    }
                    Some((page.items, page.total_count))
                }
                Err(e) => {
                    debug!(target: "shelf::store", error = %e, "prefetch fetch failed");
                    None
                }
            }
        });
    }
}

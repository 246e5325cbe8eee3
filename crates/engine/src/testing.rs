//! In-memory fakes for tests and examples
//!
//! A sample catalog record (`MenuItem`), an in-memory remote adapter
//! with injectable failure points, and an in-memory change feed. Used
//! by this crate's unit tests and by downstream integration suites;
//! none of it talks to a real backend.

use crate::feed::{ChangeFeed, Subscription};
use crate::remote::RemoteAdapter;
use crate::store::RecordEvent;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shelf_core::{
    display_order, Error, ItemId, Page, PageRequest, RankKey, RankUpdate, Ranked, Result, ScopeId,
    Timestamp,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Sample catalog record: a menu product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Stable identifier
    pub id: ItemId,
    /// Owning restaurant
    pub scope: ScopeId,
    /// Position in the scope's display order
    pub rank: RankKey,
    /// Display name (searchable)
    pub name: String,
    /// Longer description (searchable)
    pub description: String,
    /// Short code, e.g. a SKU (searchable)
    pub code: String,
    /// Whether the product is currently offered
    pub active: bool,
    /// Optional category id, matched by the category filter
    pub category: Option<String>,
    /// Last modification time (display only)
    pub updated_at: Timestamp,
}

impl MenuItem {
    /// Minimal record with the given id, scope, and rank
    pub fn new(id: impl Into<String>, scope: ScopeId, rank: RankKey) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: ItemId::new(id),
            scope,
            rank,
            description: String::new(),
            code: String::new(),
            active: true,
            category: None,
            updated_at: Timestamp::default(),
        }
    }

    /// Set the display name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the searchable code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set the category id
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Mark the record inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

impl Ranked for MenuItem {
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
        self.active
    }

    fn matches_filter(&self, filter: &str) -> bool {
        match filter {
            "active" => self.active,
            "inactive" => !self.active,
            category => self.category.as_deref() == Some(category),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.description, &self.code]
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

/// Partial field set for [`MemoryRemote::update`]
#[derive(Debug, Clone, Default)]
pub struct MenuItemPatch {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New code
    pub code: Option<String>,
    /// New active flag
    pub active: Option<bool>,
    /// New rank key
    pub rank_key: Option<RankKey>,
}

/// In-memory remote adapter with injectable failure points
///
/// Behaves per the remote contract: rank-ascending pages, exact match
/// counts, case-insensitive substring search, server-assigned ids, and
/// sequential non-transactional rank writes.
#[derive(Default)]
pub struct MemoryRemote {
    rows: Mutex<Vec<MenuItem>>,
    next_id: AtomicU64,
    fail_fetches: AtomicBool,
    persist_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    // Total rank-row writes allowed before injected failure, if set.
    rank_write_budget: Mutex<Option<usize>>,
    rank_writes: AtomicUsize,
}

impl MemoryRemote {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the given rows
    pub fn seeded(rows: Vec<MenuItem>) -> Self {
        let remote = Self::new();
        *remote.rows.lock() = rows;
        remote
    }

    /// Rows of `scope` in display order, as the backend holds them
    pub fn rows_in_order(&self, scope: &ScopeId) -> Vec<MenuItem> {
        let mut rows: Vec<MenuItem> = self
            .rows
            .lock()
            .iter()
            .filter(|r| r.scope_id() == scope)
            .cloned()
            .collect();
        rows.sort_by(display_order);
        rows
    }

    /// Make every subsequent fetch fail with `Error::Remote`
    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Allow `budget` rank-row writes, then fail mid-batch
    pub fn fail_rank_writes_after(&self, budget: usize) {
        *self.rank_write_budget.lock() = Some(budget);
    }

    /// Number of `persist_rank_keys` calls made
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_page` calls made (cache-hit assertions)
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

impl RemoteAdapter for MemoryRemote {
    type Record = MenuItem;
    type Patch = MenuItemPatch;

    fn fetch_page(&self, request: &PageRequest) -> Result<Page<MenuItem>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(Error::Remote("injected fetch failure".to_string()));
        }

        let search = request.normalized_search();
        let mut matches: Vec<MenuItem> = self
            .rows
            .lock()
            .iter()
            .filter(|r| r.scope_id() == &request.scope)
            .filter(|r| {
                request
                    .filter
                    .as_deref()
                    .map(|f| r.matches_filter(f))
                    .unwrap_or(true)
            })
            .filter(|r| {
                search
                    .as_deref()
                    .map(|term| {
                        r.search_fields()
                            .iter()
                            .any(|field| field.to_lowercase().contains(term))
                    })
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        matches.sort_by(display_order);

        let total_count = matches.len();
        let start = request.offset().min(total_count);
        let end = start
            .saturating_add(request.page_size as usize)
            .min(total_count);
        Ok(Page {
            items: matches[start..end].to_vec(),
            total_count,
        })
    }

    fn persist_rank_keys(&self, scope: &ScopeId, updates: &[RankUpdate]) -> Result<()> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock();
        for update in updates {
            if let Some(budget) = *self.rank_write_budget.lock() {
                if self.rank_writes.load(Ordering::SeqCst) >= budget {
                    // Remaining updates abandoned; rows written so far stay.
                    return Err(Error::Remote("injected rank write failure".to_string()));
                }
            }
            let row = rows
                .iter_mut()
                .filter(|r| r.scope_id() == scope)
                .find(|r| r.id() == &update.id)
                .ok_or_else(|| Error::NotFound(update.id.clone()))?;
            row.set_rank_key(update.rank_key);
            self.rank_writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn insert(&self, mut record: MenuItem) -> Result<ItemId> {
        let mut rows = self.rows.lock();
        // Server assigns both the id and the end-of-order rank; any
        // caller-provided values are ignored.
        let id = ItemId::new(format!(
            "itm-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        let rank = rows
            .iter()
            .filter(|r| r.scope_id() == record.scope_id())
            .map(|r| r.rank_key())
            .max()
            .map(|max| max + 1)
            .unwrap_or(0);
        record.id = id.clone();
        record.set_rank_key(rank);
        rows.push(record);
        Ok(id)
    }

    fn update(&self, id: &ItemId, patch: MenuItemPatch) -> Result<()> {
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        if let Some(code) = patch.code {
            row.code = code;
        }
        if let Some(active) = patch.active {
            row.active = active;
        }
        if let Some(rank_key) = patch.rank_key {
            row.set_rank_key(rank_key);
        }
        Ok(())
    }

    fn delete(&self, id: &ItemId) -> Result<()> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Err(Error::NotFound(id.clone()));
        }
        Ok(())
    }
}

type EventQueue = Mutex<VecDeque<RecordEvent<MenuItem>>>;

struct FeedSlot {
    scope: ScopeId,
    queue: Weak<EventQueue>,
    fail_next: Weak<AtomicBool>,
}

/// In-memory change feed with per-scope fan-out
///
/// Dropping a returned subscription unregisters it; `publish` prunes
/// dead slots as it goes.
#[derive(Default)]
pub struct MemoryFeed {
    slots: Mutex<Vec<FeedSlot>>,
}

impl MemoryFeed {
    /// Feed with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every live subscription of its scope
    pub fn publish(&self, event: RecordEvent<MenuItem>) {
        let mut slots = self.slots.lock();
        slots.retain(|slot| slot.queue.strong_count() > 0);
        for slot in slots.iter() {
            if &slot.scope == event.scope_id() {
                if let Some(queue) = slot.queue.upgrade() {
                    queue.lock().push_back(event.clone());
                }
            }
        }
    }

    /// Make every live subscription's next poll fail once
    pub fn disconnect_once(&self) {
        for slot in self.slots.lock().iter() {
            if let Some(flag) = slot.fail_next.upgrade() {
                flag.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Number of live subscriptions
    pub fn live_subscriptions(&self) -> usize {
        let mut slots = self.slots.lock();
        slots.retain(|slot| slot.queue.strong_count() > 0);
        slots.len()
    }
}

/// Subscription handle produced by [`MemoryFeed`]
pub struct MemorySubscription {
    queue: Arc<EventQueue>,
    fail_next: Arc<AtomicBool>,
}

impl Subscription<MenuItem> for MemorySubscription {
    fn poll(&mut self) -> Result<Vec<RecordEvent<MenuItem>>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::Remote("feed disconnected".to_string()));
        }
        Ok(self.queue.lock().drain(..).collect())
    }
}

impl ChangeFeed for MemoryFeed {
    type Record = MenuItem;
    type Sub = MemorySubscription;

    fn subscribe(&self, scope: &ScopeId) -> Result<Self::Sub> {
        let queue = Arc::new(Mutex::new(VecDeque::new()));
        let fail_next = Arc::new(AtomicBool::new(false));
        self.slots.lock().push(FeedSlot {
            scope: scope.clone(),
            queue: Arc::downgrade(&queue),
            fail_next: Arc::downgrade(&fail_next),
        });
        Ok(MemorySubscription { queue, fail_next })
    }
}

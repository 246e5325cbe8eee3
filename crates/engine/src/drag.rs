//! Drag controller: gesture orchestration over the store
//!
//! ## Interaction contract
//!
//! Rendering-agnostic. Drag start captures the dragged identity only;
//! hovering a droppable row is advisory; nothing commits until drop.
//! Dropping onto a row commits with `Placement::Before` (fixed policy);
//! dropping onto a page-edge sentinel commits the edge variant.
//! Sustained hover over a previous/next page control pages the view
//! without releasing the drag, enabling cross-page placement.
//!
//! Dragging is disabled entirely while a search term is active: reorder
//! semantics are defined only over the unfiltered order.

use crate::planner::{PageEdge, Placement};
use crate::remote::RemoteAdapter;
use crate::store::CollectionStore;
use parking_lot::Mutex;
use shelf_core::{Clock, Error, ItemId, Result, Timestamp};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Paging control being hovered while dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNav {
    /// "Previous page" control
    Prev,
    /// "Next page" control
    Next,
}

/// Drag tuning knobs
#[derive(Debug, Clone)]
pub struct DragConfig {
    /// Sustained-hover time before a page control fires; re-armed after
    /// each trigger so holding the hover keeps paging.
    pub page_hover_cooldown: Duration,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            page_hover_cooldown: Duration::from_millis(450),
        }
    }
}

struct DragState {
    dragged: ItemId,
    hover_target: Option<ItemId>,
    nav_armed: Option<(PageNav, Timestamp)>,
}

/// Orchestrates drag gestures against a [`CollectionStore`]
pub struct DragController<A: RemoteAdapter> {
    store: Arc<CollectionStore<A>>,
    clock: Arc<dyn Clock>,
    config: DragConfig,
    active: Mutex<Option<DragState>>,
}

impl<A: RemoteAdapter> DragController<A> {
    /// Create a controller with default tuning
    pub fn new(store: Arc<CollectionStore<A>>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(store, clock, DragConfig::default())
    }

    /// Create a controller with explicit tuning
    pub fn with_config(
        store: Arc<CollectionStore<A>>,
        clock: Arc<dyn Clock>,
        config: DragConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            active: Mutex::new(None),
        }
    }

    /// Id currently being dragged, if any
    pub fn dragging(&self) -> Option<ItemId> {
        self.active.lock().as_ref().map(|s| s.dragged.clone())
    }

    /// Begin dragging `id`; captures identity only, no side effects
    ///
    /// # Errors
    ///
    /// `Error::ReorderDisabled` while a search term is active.
    pub fn begin(&self, id: ItemId) -> Result<()> {
        if self.store.search_active() {
            return Err(Error::ReorderDisabled);
        }
        debug!(target: "shelf::drag", %id, "drag started");
        *self.active.lock() = Some(DragState {
            dragged: id,
            hover_target: None,
            nav_armed: None,
        });
        Ok(())
    }

    /// Advisory hover over a droppable row; commits nothing
    pub fn hover_item(&self, target: &ItemId) {
        if let Some(state) = self.active.lock().as_mut() {
            state.hover_target = Some(target.clone());
        }
    }

    /// Row currently hovered, if any
    pub fn hover_target(&self) -> Option<ItemId> {
        self.active.lock().as_ref().and_then(|s| s.hover_target.clone())
    }

    /// Sustained hover over a page control while dragging
    ///
    /// Call repeatedly while the pointer stays over the control. Once
    /// the hover has been sustained for the cooldown, the displayed page
    /// advances/retreats (without releasing the drag) and the cooldown
    /// re-arms. Returns whether a page change fired.
    ///
    /// # Errors
    ///
    /// `Error::NoActiveDrag` without a drag in progress; `Error::Remote`
    /// when the page load behind a fired trigger fails.
    pub fn hover_page_nav(&self, nav: PageNav) -> Result<bool> {
        let now = self.clock.now();
        {
            let mut active = self.active.lock();
            let state = active.as_mut().ok_or(Error::NoActiveDrag)?;
            match state.nav_armed {
                Some((armed_nav, since))
                    if armed_nav == nav
                        && now.micros_since(since)
                            >= self.config.page_hover_cooldown.as_micros() as u64 =>
                {
                    state.nav_armed = Some((nav, now));
                }
                Some((armed_nav, _)) if armed_nav == nav => return Ok(false),
                _ => {
                    state.nav_armed = Some((nav, now));
                    return Ok(false);
                }
            }
        }
        self.step_page(nav)
    }

    /// Pointer left the page control; disarm the cooldown
    pub fn leave_page_nav(&self) {
        if let Some(state) = self.active.lock().as_mut() {
            state.nav_armed = None;
        }
    }

    /// Drop onto a row: commit `Placement::Before` against it
    ///
    /// # Errors
    ///
    /// `Error::NoActiveDrag` without a drag in progress;
    /// `Error::ReorderDisabled` if a search became active mid-drag;
    /// otherwise as [`CollectionStore::reorder`]. The drag ends either
    /// way.
    pub fn drop_on_item(&self, target: &ItemId) -> Result<()> {
        let dragged = self.take_dragged()?;
        if self.store.search_active() {
            return Err(Error::ReorderDisabled);
        }
        debug!(target: "shelf::drag", %dragged, %target, "drop committed");
        self.store.reorder(&dragged, target, Placement::Before)
    }

    /// Drop onto a page-edge sentinel
    ///
    /// # Errors
    ///
    /// As [`DragController::drop_on_item`].
    pub fn drop_on_edge(&self, edge: PageEdge) -> Result<()> {
        let dragged = self.take_dragged()?;
        if self.store.search_active() {
            return Err(Error::ReorderDisabled);
        }
        debug!(target: "shelf::drag", %dragged, ?edge, "edge drop committed");
        self.store.reorder_to_edge(&dragged, edge)
    }

    /// Abandon the drag without committing
    pub fn cancel(&self) {
        if self.active.lock().take().is_some() {
            debug!(target: "shelf::drag", "drag cancelled");
        }
    }

    fn take_dragged(&self) -> Result<ItemId> {
        self.active
            .lock()
            .take()
            .map(|s| s.dragged)
            .ok_or(Error::NoActiveDrag)
    }

    fn step_page(&self, nav: PageNav) -> Result<bool> {
        let request = match self.store.current_request() {
            Some(request) => request,
            None => return Ok(false),
        };
        let total = self.store.snapshot().total_count;
        let next = match nav {
            PageNav::Prev => {
                if request.page == 0 {
                    return Ok(false);
                }
                request.at_page(request.page - 1)
            }
            PageNav::Next => {
                if !request.has_next_page(total) {
                    return Ok(false);
                }
                request.at_page(request.page + 1)
            }
        };
        debug!(target: "shelf::drag", page = next.page, "paged while dragging");
        self.store.load(next)?;
        Ok(true)
    }
}

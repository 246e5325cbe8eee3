//! Change-feed listener
//!
//! ## Design
//!
//! The remote store pushes mutation notifications per (entity type,
//! scope) with at-least-once delivery and no ordering guarantee
//! relative to the subscriber's own writes. The transport sits behind
//! the `ChangeFeed` trait; the `FeedListener` owns the subscription
//! lifecycle and folds drained events into the collection store, which
//! handles idempotence.
//!
//! Delivery errors and disconnects never surface as user-facing
//! failures: the view degrades to eventual consistency until the next
//! manual reload or successful poll.

use crate::remote::RemoteAdapter;
use crate::store::{CollectionStore, RecordEvent};
use shelf_core::{Ranked, Result, ScopeId};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Live subscription to one scope's change feed
///
/// Dropping the subscription tears down the transport-side
/// registration.
pub trait Subscription<R>: Send {
    /// Drain events delivered since the previous poll
    ///
    /// # Errors
    ///
    /// `Error::Remote` on a delivery failure or disconnect. Callers at
    /// the listener boundary log and swallow this.
    fn poll(&mut self) -> Result<Vec<RecordEvent<R>>>;
}

/// Push-notification transport for one entity type
pub trait ChangeFeed: Send + Sync {
    /// Entity type delivered by this feed
    type Record: Ranked;

    /// Subscription handle type
    type Sub: Subscription<Self::Record>;

    /// Open a subscription for every mutation in `scope`
    ///
    /// # Errors
    ///
    /// `Error::Remote` when the transport cannot subscribe.
    fn subscribe(&self, scope: &ScopeId) -> Result<Self::Sub>;
}

impl<F: ChangeFeed> ChangeFeed for Arc<F> {
    type Record = F::Record;
    type Sub = F::Sub;

    fn subscribe(&self, scope: &ScopeId) -> Result<Self::Sub> {
        (**self).subscribe(scope)
    }
}

struct ActiveSubscription<F: ChangeFeed> {
    token: Uuid,
    scope: ScopeId,
    subscription: F::Sub,
}

/// Owns at most one live change-feed subscription
///
/// Leaving a scope (navigation, tenant switch) must call
/// [`FeedListener::unsubscribe`] or subscribe to the new scope, which
/// tears the previous subscription down.
pub struct FeedListener<F: ChangeFeed> {
    feed: F,
    active: Option<ActiveSubscription<F>>,
}

impl<F: ChangeFeed> FeedListener<F> {
    /// Create a listener over a feed transport; no subscription yet
    pub fn new(feed: F) -> Self {
        Self { feed, active: None }
    }

    /// Subscribe to `scope`, replacing any previous subscription
    ///
    /// # Errors
    ///
    /// `Error::Remote` when the transport cannot subscribe; the listener
    /// is left unsubscribed.
    pub fn subscribe(&mut self, scope: &ScopeId) -> Result<()> {
        self.unsubscribe();
        let subscription = self.feed.subscribe(scope)?;
        let token = Uuid::new_v4();
        info!(target: "shelf::feed", %scope, %token, "subscribed");
        self.active = Some(ActiveSubscription {
            token,
            scope: scope.clone(),
            subscription,
        });
        Ok(())
    }

    /// Tear down the current subscription, if any
    pub fn unsubscribe(&mut self) {
        if let Some(active) = self.active.take() {
            info!(target: "shelf::feed", scope = %active.scope, token = %active.token, "unsubscribed");
        }
    }

    /// Scope currently subscribed to, if any
    pub fn scope(&self) -> Option<&ScopeId> {
        self.active.as_ref().map(|a| &a.scope)
    }

    /// Drain pending events into the store; returns how many were applied
    ///
    /// A poll failure is logged and swallowed: the subscription stays
    /// up and the view degrades to eventual consistency.
    pub fn pump<A>(&mut self, store: &CollectionStore<A>) -> usize
    where
        A: RemoteAdapter<Record = F::Record>,
    {
        let active = match self.active.as_mut() {
            Some(active) => active,
            None => return 0,
        };
        match active.subscription.poll() {
            Ok(events) => {
                let count = events.len();
                for event in events {
                    store.apply_remote_event(event);
                }
                count
            }
            Err(e) => {
                warn!(target: "shelf::feed", scope = %active.scope, error = %e, "feed poll failed, degrading to eventual consistency");
                0
            }
        }
    }
}

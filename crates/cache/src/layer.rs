//! Two-tier read-through cache for page queries
//!
//! ## Design
//!
//! Tier 1 is a process-local map, alive for the session. Tier 2 is a
//! persisted `SessionStore` shared across reloads of the same browsing
//! session. Reads check T1 first, then T2 (promoting fresh hits into
//! T1). Writes land in both tiers; a T2 write failure is logged and
//! ignored, as if caching were disabled for that entry.
//!
//! Freshness: an entry is valid iff `now - timestamp < ttl` (60s
//! default). Expired entries are treated as misses and evicted lazily.
//! Invalidation is all-or-nothing per scope: `invalidate_scope` purges
//! every entry of that scope from both tiers regardless of TTL.
//!
//! The clock is injected so freshness logic is deterministically
//! testable.

use crate::session::SessionStore;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shelf_core::{Clock, ScopeId, Signature, Timestamp};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Namespace prefix for tier-2 keys, so unrelated session-store entries
/// survive scope invalidation.
const SESSION_KEY_PREFIX: &str = "shelf:cache:";

/// Cache tuning knobs
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum age at which an entry is considered fresh
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
        }
    }
}

/// One cached page: the query's records, exact match count, and the
/// write timestamp the freshness rule is evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<R> {
    /// String form of the signature this entry was written under
    pub signature: String,
    /// Write time; drives the freshness rule
    pub timestamp: Timestamp,
    /// Records on the cached page, rank-ascending
    pub items: Vec<R>,
    /// Exact match count for the whole query
    pub total_count: usize,
}

impl<R> CacheEntry<R> {
    fn is_fresh(&self, now: Timestamp, ttl: Duration) -> bool {
        now.within(self.timestamp, ttl)
    }
}

/// Two-tier read-through cache keyed by query signature
///
/// Entries are never partially updated: a scope's entries are either
/// served as written or purged wholesale by `invalidate_scope`.
pub struct CacheLayer<R> {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    session: Arc<dyn SessionStore>,
    local: RwLock<FxHashMap<String, CacheEntry<R>>>,
}

impl<R> CacheLayer<R>
where
    R: Clone + Serialize + DeserializeOwned,
{
    /// Create a cache over the given session store, with the default TTL
    pub fn new(clock: Arc<dyn Clock>, session: Arc<dyn SessionStore>) -> Self {
        Self::with_config(clock, session, CacheConfig::default())
    }

    /// Create a cache with explicit tuning
    pub fn with_config(
        clock: Arc<dyn Clock>,
        session: Arc<dyn SessionStore>,
        config: CacheConfig,
    ) -> Self {
        Self {
            config,
            clock,
            session,
            local: RwLock::new(FxHashMap::default()),
        }
    }

    /// Read a cached page, if a fresh entry exists in either tier
    ///
    /// A fresh tier-2 hit is promoted into tier 1. Expired entries are
    /// evicted on the way through and reported as misses.
    pub fn read(&self, signature: &Signature) -> Option<CacheEntry<R>> {
        let now = self.clock.now();
        let key = signature.as_str();

        {
            let mut local = self.local.write();
            if let Some(entry) = local.get(key) {
                if entry.is_fresh(now, self.config.ttl) {
                    debug!(target: "shelf::cache", %signature, tier = "local", "cache hit");
                    return Some(entry.clone());
                }
                local.remove(key);
            }
        }

        let session_key = Self::session_key(key);
        if let Some(raw) = self.session.get(&session_key) {
            match serde_json::from_str::<CacheEntry<R>>(&raw) {
                Ok(entry) if entry.is_fresh(now, self.config.ttl) => {
                    debug!(target: "shelf::cache", %signature, tier = "session", "cache hit");
                    self.local.write().insert(key.to_string(), entry.clone());
                    return Some(entry);
                }
                Ok(_) => {
                    self.session.remove(&session_key);
                }
                Err(e) => {
                    warn!(target: "shelf::cache", %signature, error = %e, "discarding undecodable session entry");
                    self.session.remove(&session_key);
                }
            }
        }

        debug!(target: "shelf::cache", %signature, "cache miss");
        None
    }

    /// Write a page into both tiers, timestamped now
    ///
    /// A session-tier failure (quota, serialization) is logged and
    /// swallowed; correctness never depends on tier 2.
    pub fn write(&self, signature: &Signature, items: Vec<R>, total_count: usize) {
        let entry = self.make_entry(signature, items, total_count);

        match serde_json::to_string(&entry) {
            Ok(raw) => {
                if let Err(e) = self.session.set(&Self::session_key(signature.as_str()), &raw) {
                    warn!(target: "shelf::cache", %signature, error = %e, "session cache write failed");
                }
            }
            Err(e) => {
                warn!(target: "shelf::cache", %signature, error = %e, "session cache encode failed");
            }
        }

        self.local
            .write()
            .insert(signature.as_str().to_string(), entry);
    }

    /// Opportunistically load a page into tier 1 only
    ///
    /// Skipped when a fresh entry already exists for `signature`. The
    /// loader may decline (scope changed underneath it, fetch failed) by
    /// returning `None`, in which case nothing is stored.
    pub fn prefetch<F>(&self, signature: &Signature, loader: F)
    where
        F: FnOnce() -> Option<(Vec<R>, usize)>,
    {
        if self.has_fresh(signature) {
            debug!(target: "shelf::cache", %signature, "prefetch skipped, fresh entry exists");
            return;
        }
        if let Some((items, total_count)) = loader() {
            debug!(target: "shelf::cache", %signature, "prefetched into local tier");
            let entry = self.make_entry(signature, items, total_count);
            self.local
                .write()
                .insert(signature.as_str().to_string(), entry);
        }
    }

    /// Purge every entry of `scope` from both tiers, regardless of TTL
    pub fn invalidate_scope(&self, scope: &ScopeId) {
        let prefix = Signature::scope_prefix(scope);

        self.local.write().retain(|key, _| !key.starts_with(&prefix));

        let session_prefix = Self::session_key(&prefix);
        for key in self.session.keys() {
            if key.starts_with(&session_prefix) {
                self.session.remove(&key);
            }
        }

        debug!(target: "shelf::cache", %scope, "scope invalidated");
    }

    /// Whether a fresh entry exists for `signature` in either tier
    pub fn has_fresh(&self, signature: &Signature) -> bool {
        let now = self.clock.now();
        let key = signature.as_str();

        if let Some(entry) = self.local.read().get(key) {
            if entry.is_fresh(now, self.config.ttl) {
                return true;
            }
        }

        self.session
            .get(&Self::session_key(key))
            .and_then(|raw| serde_json::from_str::<CacheEntry<R>>(&raw).ok())
            .map(|entry| entry.is_fresh(now, self.config.ttl))
            .unwrap_or(false)
    }

    fn make_entry(&self, signature: &Signature, items: Vec<R>, total_count: usize) -> CacheEntry<R> {
        CacheEntry {
            signature: signature.as_str().to_string(),
            timestamp: self.clock.now(),
            items,
            total_count,
        }
    }

    fn session_key(signature_key: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{signature_key}")
    }
}

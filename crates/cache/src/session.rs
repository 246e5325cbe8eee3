//! Session-scoped persisted key-value store abstraction
//!
//! The cache's second tier persists entries into a string-keyed,
//! string-valued store that outlives the process-local tier but is
//! bounded by a storage quota (a browser session store, a small on-disk
//! map, ...). This trait enables swapping that backend without touching
//! the cache layer.
//!
//! Write failures are expected under quota pressure. They are surfaced
//! as `SessionStoreError` so the cache layer can log and swallow them;
//! they must never propagate past the cache boundary.

use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

/// Failure writing to the session store
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// The store's quota would be exceeded by this write
    #[error("session store quota exceeded")]
    QuotaExceeded,

    /// The store is unavailable or rejected the write
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed, string-valued store scoped to the browsing session
///
/// Thread safety: implementations must be safe to call from multiple
/// threads (`Send + Sync`); the cache layer serializes its own state
/// but does not serialize access to the backend.
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error when the quota is exhausted or the backend is
    /// unavailable. Callers at the cache boundary swallow this.
    fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError>;

    /// Remove the value stored under `key`, if any
    fn remove(&self, key: &str);

    /// All keys currently present, in unspecified order
    fn keys(&self) -> Vec<String>;
}

/// In-memory `SessionStore` with an optional byte quota
///
/// The native stand-in for a browser session store, also used by tests
/// to exercise quota-failure paths deterministically.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemorySessionStore {
    /// Unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once keys + values exceed `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of entries currently stored
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn used_bytes(entries: &HashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock();
        if let Some(quota) = self.quota_bytes {
            let without_key = Self::used_bytes(&entries)
                - entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            if without_key + key.len() + value.len() > quota {
                return Err(SessionStoreError::QuotaExceeded);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemorySessionStore::new();
        store.set("k1", "v1").unwrap();
        assert_eq!(store.get("k1").as_deref(), Some("v1"));
        store.remove("k1");
        assert_eq!(store.get("k1"), None);
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemorySessionStore::new();
        store.set("k1", "v1").unwrap();
        store.set("k1", "v2").unwrap();
        assert_eq!(store.get("k1").as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let store = MemorySessionStore::with_quota(10);
        let err = store.set("key", "a-very-long-value").unwrap_err();
        assert!(matches!(err, SessionStoreError::QuotaExceeded));
        assert!(store.is_empty());
    }

    #[test]
    fn test_quota_counts_replacement_not_double() {
        let store = MemorySessionStore::with_quota(8);
        store.set("k", "1234567").unwrap();
        // Replacing the same key must not count the old value against quota.
        store.set("k", "7654321").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("7654321"));
    }

    #[test]
    fn test_keys_lists_all() {
        let store = MemorySessionStore::new();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}

//! Error types for the sync engine
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::types::ItemId;
use thiserror::Error;

/// Result type alias for sync-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the sync engine
#[derive(Debug, Error)]
pub enum Error {
    /// Remote store failure (network, backend outage).
    ///
    /// Callers treat this as non-fatal: the last-known materialized
    /// state is kept, never cleared to empty.
    #[error("remote store error: {0}")]
    Remote(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A dragged or target record is no longer present in the
    /// authoritative order. The caller must reload and abort the gesture.
    #[error("stale reference to record {0}")]
    StaleReference(ItemId),

    /// Reordering is defined only over the unfiltered order; it is
    /// rejected while a search term is active.
    #[error("reordering is disabled while a search is active")]
    ReorderDisabled,

    /// A drop or hover arrived with no drag in progress
    #[error("no drag in progress")]
    NoActiveDrag,

    /// Record not found in the remote store
    #[error("record not found: {0}")]
    NotFound(ItemId),

    /// Invalid operation or state
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

//! shelf-core: foundational types for the shelf sync engine
//!
//! Defines the types every other layer builds on:
//! - identifiers and the `Ranked` capability trait ([`types`])
//! - the error enum and `Result` alias ([`error`])
//! - the injectable clock ([`clock`])
//! - page queries and cache signatures ([`query`])
//!
//! This crate has no I/O and no knowledge of caching or remote stores.

pub mod clock;
pub mod error;
pub mod query;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use query::{Page, PageRequest, Signature};
pub use types::{display_order, ItemId, RankKey, RankUpdate, Ranked, ScopeId, Timestamp};

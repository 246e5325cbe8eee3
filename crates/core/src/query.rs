//! Page queries and cache signatures
//!
//! A `PageRequest` describes one page of one scope's ordered collection:
//! scope, zero-based page index, page size, optional status/category
//! filter, and optional search term. Its `Signature` is the deterministic
//! cache key derived from those fields.
//!
//! ## Key design
//!
//! Signature string form: `<scope>|p=<page>|n=<size>|f=<filter>|q=<search>`.
//! The scope comes first so per-scope invalidation is a prefix purge over
//! both cache tiers. Free-form fields are backslash-escaped so a `|`
//! inside a scope, filter, or search term cannot collide with the
//! separator.

use crate::types::ScopeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One page of one scope's ordered collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Scope whose collection is being viewed
    pub scope: ScopeId,
    /// Zero-based page index
    pub page: u32,
    /// Records per page
    pub page_size: u32,
    /// Optional entity-specific status/category filter
    pub filter: Option<String>,
    /// Optional search term (matched case-insensitively as a substring)
    pub search: Option<String>,
}

impl PageRequest {
    /// Request the given page of a scope, unfiltered and unsearched
    pub fn new(scope: ScopeId, page: u32, page_size: u32) -> Self {
        Self {
            scope,
            page,
            page_size,
            filter: None,
            search: None,
        }
    }

    /// Restrict to records matching an entity-specific filter
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Restrict to records matching a search term
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Same query, different page
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Normalized search term: trimmed and lowercased, `None` when the
    /// term is absent or blank. Two requests differing only in search
    /// whitespace/case share a signature.
    pub fn normalized_search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }

    /// Whether a non-empty search term is active
    pub fn has_search(&self) -> bool {
        self.normalized_search().is_some()
    }

    /// Row offset of this page
    pub fn offset(&self) -> usize {
        self.page as usize * self.page_size as usize
    }

    /// Whether a page after this one exists given the exact match count
    pub fn has_next_page(&self, total_count: usize) -> bool {
        self.offset() + (self.page_size as usize) < total_count
    }

    /// Deterministic cache key for this request
    pub fn signature(&self) -> Signature {
        Signature::of(self)
    }
}

/// Deterministic cache key for a `PageRequest`
///
/// Equal requests (after search normalization) produce equal signatures.
/// The string form is scope-prefixed; see [`Signature::scope_prefix`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    scope: ScopeId,
    key: String,
}

// Free-form fields (scope, filter, search) are escaped so the `|`
// separator stays unambiguous: distinct queries must never share a key,
// and a scope prefix must never match another scope's entries.
fn escape_field(field: &str) -> String {
    field.replace('\\', "\\\\").replace('|', "\\|")
}

impl Signature {
    fn of(req: &PageRequest) -> Self {
        let key = format!(
            "{}|p={}|n={}|f={}|q={}",
            escape_field(req.scope.as_str()),
            req.page,
            req.page_size,
            escape_field(req.filter.as_deref().unwrap_or("")),
            escape_field(&req.normalized_search().unwrap_or_default()),
        );
        Self {
            scope: req.scope.clone(),
            key,
        }
    }

    /// Scope this signature belongs to
    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    /// Full string form of the key
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Prefix shared by every signature of `scope`; used for per-scope
    /// invalidation over string-keyed stores. Matches exactly the
    /// entries of `scope`, never those of a scope it is a prefix of.
    pub fn scope_prefix(scope: &ScopeId) -> String {
        format!("{}|", escape_field(scope.as_str()))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// One fetched page: the records plus the exact match count for the
/// whole query (not just this page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<R> {
    /// Records on this page, rank-ascending
    pub items: Vec<R>,
    /// Exact count of records matching the query across all pages
    pub total_count: usize,
}

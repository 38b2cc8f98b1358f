//! JSON:API envelope types shared by every endpoint.
//!
//! List endpoints return [`Envelope<T>`] (`{ data: [...], meta: { pagination } }`),
//! detail and write endpoints return [`Single<T>`] (`{ data: {...} }`), and
//! each element of `data` is a [`Resource<A>`] carrying typed attributes.

use serde::{Deserialize, Serialize};

// ── Pagination ───────────────────────────────────────────────────────

/// Pagination counters from `meta.pagination`.
///
/// After aggregation these still describe the *first* request only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub count: u64,
    pub per_page: u64,
    pub current_page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Paginated list wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> Envelope<T> {
    /// `total_pages` from the metadata; a missing block means one page.
    pub fn total_pages(&self) -> u32 {
        self.meta
            .as_ref()
            .and_then(|m| m.pagination.as_ref())
            .map_or(1, |p| p.total_pages)
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.meta.as_ref().and_then(|m| m.pagination.as_ref())
    }
}

/// Detail / write response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Single<T> {
    pub data: T,
}

// ── Resource object ──────────────────────────────────────────────────

/// A JSON:API resource object: `{ "type": ..., "id": ..., "attributes": {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<A> {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: A,
}

//! Page-number pagination shared by every listing.
//!
//! Pages are fixed at [`PAGE_SIZE`] items. A requested page past the end is
//! clamped down to the last page instead of being rejected, so an empty
//! collection resolves to page `0` of `0`.

use serde::{Deserialize, Serialize};

/// Number of items on every page.
pub const PAGE_SIZE: u64 = 10;

/// A caller's page request (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl PageRequest {
    /// Missing or zero pages default to the first page.
    pub fn new(page: Option<u64>) -> Self {
        Self {
            page: page.filter(|p| *p >= 1).unwrap_or(1),
        }
    }

    /// Lenient parse of a raw `?page=` value; anything unusable means page 1.
    pub fn parse(raw: Option<&str>) -> Self {
        Self::new(raw.and_then(|s| s.trim().parse::<u64>().ok()))
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// Resolve this request against the total number of matching items.
    pub fn resolve(self, total: u64) -> PageMeta {
        let pages = total.div_ceil(PAGE_SIZE);
        PageMeta {
            total,
            pages,
            page: self.page.min(pages),
        }
    }
}

/// Resolved page position, echoed back to the client as `meta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total matching items across all pages.
    pub total: u64,
    /// Total page count, `ceil(total / PAGE_SIZE)`.
    pub pages: u64,
    /// The page actually served (after clamping).
    pub page: u64,
}

impl PageMeta {
    /// Number of items to skip before the served page.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(PAGE_SIZE)
    }

    /// Maximum number of items on the served page.
    pub fn limit(&self) -> u64 {
        PAGE_SIZE
    }
}

/// One page of results plus its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(meta: PageMeta, data: Vec<T>) -> Self {
        Self { meta, data }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            meta: self.meta,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

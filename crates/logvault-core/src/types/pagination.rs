//! Pagination types for the file and entry query surface.

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 500;

/// A 1-based page window over a query result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a page request, clamping out-of-range values.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Re-apply the clamping rules (used after deserializing from a query string).
    pub fn normalized(self) -> Self {
        Self::new(self.page, self.page_size)
    }

    /// SQL `OFFSET` value.
    pub fn offset(&self) -> i64 {
        let offset = self.page.saturating_sub(1).saturating_mul(self.page_size);
        i64::try_from(offset).unwrap_or(i64::MAX)
    }

    /// SQL `LIMIT` value.
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of matching items.
    pub total_items: u64,
    /// Total number of pages (at least 1).
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Build a page from the rows fetched for `request` and the total count.
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(request.page_size).max(1);
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages,
        }
    }

    /// Whether a further page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

//! Pagination query parameters.
//!
//! Query structs carry `page`/`pageSize` as their own fields; `#[serde(flatten)]`
//! breaks numeric parsing of query strings.

use logvault_core::types::pagination::PageRequest;

/// Build a clamped `PageRequest` from optional query values.
pub fn page_request(page: Option<u64>, page_size: Option<u64>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest::new(
        page.unwrap_or(defaults.page),
        page_size.unwrap_or(defaults.page_size),
    )
}

//! Custom extractors and query parameter types.

pub mod pagination;

pub use pagination::page_request;

//! Retention enforcement and gzip archival.

pub mod archive;
pub mod service;

pub use service::{CleanupSummary, RetentionManager};

//! # logvault-service
//!
//! The two engines behind LogVault:
//! - [`scanner::LogScanner`] keeps the index store in sync with each
//!   service's log directory, re-indexing only new or changed files.
//! - [`retention::RetentionManager`] archives or deletes files that have
//!   aged past the retention window and purges their entries.

pub mod outcome;
pub mod retention;
pub mod scanner;

pub use outcome::OperationOutcome;
pub use retention::{CleanupSummary, RetentionManager};
pub use scanner::{LogScanner, ScanSummary};

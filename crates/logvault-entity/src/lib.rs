//! # logvault-entity
//!
//! Domain entity models for LogVault. Every struct in this crate
//! represents an index store row or a value object passed to the store.
//! Row types additionally derive `sqlx::FromRow`.

pub mod log_entry;
pub mod log_file;
pub mod retention;

pub use log_entry::{LogEntry, LogLevel, NewLogEntry};
pub use log_file::{FileId, FileStat, LogFile};
pub use retention::{RetentionConfig, UpdateRetentionConfig};

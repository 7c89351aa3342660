//! Repository implementations for the index store tables.

pub mod log_entry;
pub mod log_file;
pub mod retention_config;

pub use log_entry::{EntryQuery, LogEntryRepository};
pub use log_file::LogFileRepository;
pub use retention_config::RetentionConfigRepository;

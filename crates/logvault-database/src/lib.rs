//! # logvault-database
//!
//! SQLite connection management and the repositories that make up the
//! index store: log files, log entries, and the retention config row.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::IndexStore;

//! Indexed log file entities.

pub mod model;

pub use model::{FileId, FileStat, LogFile};

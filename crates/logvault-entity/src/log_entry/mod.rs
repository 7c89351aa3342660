//! Parsed log line entities.

pub mod level;
pub mod model;

pub use level::LogLevel;
pub use model::{LogEntry, NewLogEntry};

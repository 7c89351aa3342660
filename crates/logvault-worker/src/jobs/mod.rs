//! Built-in job handler implementations.

pub mod cleanup;
pub mod scan;

pub use cleanup::RetentionCleanupJob;
pub use scan::LogScanJob;

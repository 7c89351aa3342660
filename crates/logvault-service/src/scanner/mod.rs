//! Log directory scanning and incremental re-indexing.

pub mod discovery;
pub mod parser;
pub mod service;

pub use parser::LineParser;
pub use service::{LogScanner, ScanSummary, canonical_dir};

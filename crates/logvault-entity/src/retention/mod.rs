//! Retention policy entities.

pub mod model;

pub use model::{RetentionConfig, UpdateRetentionConfig};

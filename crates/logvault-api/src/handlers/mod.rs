//! HTTP handlers grouped by concern.

pub mod health;
pub mod query;
pub mod settings;

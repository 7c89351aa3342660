//! Core type definitions used across the LogVault workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};

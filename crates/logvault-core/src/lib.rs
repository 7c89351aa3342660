//! # logvault-core
//!
//! Core crate for LogVault. Contains configuration schemas, pagination
//! types, and the unified error system shared by the scanner, retention,
//! scheduling, and API crates.
//!
//! This crate has **no** internal dependencies on other LogVault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

//! # logvault-api
//!
//! HTTP API layer for LogVault built on Axum.
//!
//! Exposes the retention settings interface (config, manual cleanup,
//! manual scan) and read-only queries over the index store.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;

//! Convenience result type alias for LogVault.

use crate::error::AppError;

/// A specialized `Result` type for LogVault operations.
pub type AppResult<T> = Result<T, AppError>;

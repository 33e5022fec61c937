//! Convenience result type alias for the placement engine.

use crate::error::AppError;

/// A specialized `Result` type for placement operations.
pub type AppResult<T> = Result<T, AppError>;

//! Convenience result type alias for PageHub.

use crate::error::AppError;

/// A specialized `Result` type for PageHub operations.
pub type AppResult<T> = Result<T, AppError>;

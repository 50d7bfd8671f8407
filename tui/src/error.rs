//! Error types for the Focus Timer front-end.
//!
//! [`FormError`] carries the user-facing messages shown under the new-cycle
//! form. [`AppError`] wraps everything else that can stop a cycle run.

use focus_timer_core::{CycleError, TimerError, ValidationError};
use thiserror::Error;

/// Problems with the new-cycle form input, worded for display.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    /// The task field is empty.
    #[error("enter a task")]
    EmptyTask,

    /// Minutes below the minimum.
    #[error("cycle must be at least 1 minute")]
    TooShort,

    /// Minutes above the maximum.
    #[error("cycle must be at most 60 minutes")]
    TooLong,
}

impl From<ValidationError> for FormError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyTask => Self::EmptyTask,
            ValidationError::DurationTooShort { .. } => Self::TooShort,
            ValidationError::DurationTooLong { .. } => Self::TooLong,
        }
    }
}

/// Errors that can stop the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// The cycle engine rejected an operation.
    #[error("cycle error: {0}")]
    Cycle(#[from] CycleError),

    /// The countdown driver failed.
    #[error("timer error: {0}")]
    Timer(#[from] TimerError),

    /// Output I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Summary serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for front-end operations.
pub type Result<T> = std::result::Result<T, AppError>;

//! Error types for the focus timer core.
//!
//! Cycle operations fail in three distinct ways, and callers are expected to
//! treat them differently:
//!
//! - [`ValidationError`] is user-correctable (bad task name or duration).
//! - [`CycleError::Conflict`] is a caller bug: the presentation layer should
//!   never offer "start" while a cycle is running.
//! - [`CycleError::InvariantViolation`] is a bug in the engine itself.
//!
//! A stale countdown tick is not an error; see
//! [`TickOutcome`](crate::store::TickOutcome).

use thiserror::Error;

use crate::types::CycleId;

/// Rejected new-cycle input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task name is empty or only whitespace.
    #[error("task cannot be empty")]
    EmptyTask,

    /// Duration is below [`MIN_DURATION_MINUTES`](crate::types::MIN_DURATION_MINUTES).
    #[error("cycle must be at least 1 minute (got {minutes})")]
    DurationTooShort { minutes: u32 },

    /// Duration is above [`MAX_DURATION_MINUTES`](crate::types::MAX_DURATION_MINUTES).
    #[error("cycle must be at most 60 minutes (got {minutes})")]
    DurationTooLong { minutes: u32 },
}

/// Errors returned by [`CycleStore`](crate::store::CycleStore) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// The request failed validation.
    #[error("invalid cycle: {0}")]
    Validation(#[from] ValidationError),

    /// A cycle is already active.
    #[error("cycle {active} is already active")]
    Conflict {
        /// The cycle currently counting down.
        active: CycleId,
    },

    /// An operation would break a lifecycle invariant.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Errors from the countdown driver.
#[derive(Error, Debug)]
pub enum TimerError {
    /// The countdown driver task stopped unexpectedly.
    #[error("countdown driver error: {0}")]
    Driver(String),
}

/// A specialized `Result` type for cycle operations.
pub type Result<T> = std::result::Result<T, CycleError>;

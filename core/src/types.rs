//! Cycle types for the focus timer.
//!
//! This module defines the data model shared between the cycle store, the
//! countdown driver and any presentation layer. All types serialize to
//! camelCase JSON.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Shortest cycle that can be started, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 1;

/// Longest cycle that can be started, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 60;

/// Opaque identifier of a cycle.
///
/// Identifiers are issued by a [`CycleStore`](crate::store::CycleStore) from a
/// monotonically increasing counter, so comparing two ids from the same store
/// tells which cycle was created first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(u64);

impl CycleId {
    pub(crate) fn from_generation(generation: u64) -> Self {
        Self(generation)
    }

    /// Returns the generation number this id was issued with.
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cyc_{:06}", self.0)
    }
}

/// Request payload for starting a new cycle.
///
/// This mirrors what a new-cycle form submits. [`NewCycle::validate`] checks
/// the same rules the store enforces, so callers can surface problems before
/// ever reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCycle {
    /// Name of the task being focused on.
    pub task: String,

    /// Requested duration in minutes.
    pub minutes_amount: u32,
}

impl NewCycle {
    /// Creates a new request.
    pub fn new(task: impl Into<String>, minutes_amount: u32) -> Self {
        Self {
            task: task.into(),
            minutes_amount,
        }
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns the first rule the request breaks:
    /// - [`ValidationError::EmptyTask`] if the task is empty or whitespace
    /// - [`ValidationError::DurationTooShort`] if below [`MIN_DURATION_MINUTES`]
    /// - [`ValidationError::DurationTooLong`] if above [`MAX_DURATION_MINUTES`]
    ///
    /// # Example
    ///
    /// ```
    /// use focus_timer_core::types::NewCycle;
    /// use focus_timer_core::error::ValidationError;
    ///
    /// assert!(NewCycle::new("Write report", 25).validate().is_ok());
    /// assert_eq!(
    ///     NewCycle::new("  ", 25).validate(),
    ///     Err(ValidationError::EmptyTask)
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_task(&self.task)?;
        validate_duration(self.minutes_amount)
    }
}

pub(crate) fn validate_task(task: &str) -> Result<(), ValidationError> {
    if task.trim().is_empty() {
        return Err(ValidationError::EmptyTask);
    }
    Ok(())
}

pub(crate) fn validate_duration(minutes: u32) -> Result<(), ValidationError> {
    if minutes < MIN_DURATION_MINUTES {
        return Err(ValidationError::DurationTooShort { minutes });
    }
    if minutes > MAX_DURATION_MINUTES {
        return Err(ValidationError::DurationTooLong { minutes });
    }
    Ok(())
}

/// Lifecycle status of a cycle, derived from its timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Counting down.
    InProgress,
    /// Stopped early by the user.
    Interrupted,
    /// Ran for its full duration.
    Finished,
}

impl CycleStatus {
    /// Returns true for `Interrupted` and `Finished`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// Short human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Interrupted => "interrupted",
            Self::Finished => "finished",
        }
    }
}

/// One timed attempt at a task.
///
/// A cycle is created active and is terminated exactly once, either by an
/// interrupt or by the countdown reaching its duration. Terminal cycles are
/// never mutated again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    /// Store-issued identifier.
    pub id: CycleId,

    /// Task being focused on.
    pub task: String,

    /// Planned duration in minutes, within `[1, 60]`.
    pub duration_minutes: u32,

    /// When the cycle started.
    pub started_at: DateTime<Utc>,

    /// When the cycle was interrupted, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupted_at: Option<DateTime<Utc>>,

    /// When the cycle finished, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Cycle {
    pub(crate) fn start(
        id: CycleId,
        task: String,
        duration_minutes: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task,
            duration_minutes,
            started_at,
            interrupted_at: None,
            finished_at: None,
        }
    }

    /// Planned duration in seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }

    /// Derived lifecycle status.
    #[must_use]
    pub fn status(&self) -> CycleStatus {
        match (self.interrupted_at, self.finished_at) {
            (Some(_), _) => CycleStatus::Interrupted,
            (None, Some(_)) => CycleStatus::Finished,
            (None, None) => CycleStatus::InProgress,
        }
    }

    /// Returns true once the cycle has been interrupted or finished.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminated_at().is_some()
    }

    /// The timestamp that ended the cycle, if any.
    #[must_use]
    pub fn terminated_at(&self) -> Option<DateTime<Utc>> {
        self.interrupted_at.or(self.finished_at)
    }

    /// The instant the countdown reaches zero.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.started_at + chrono::Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Whole seconds between `started_at` and `now`, clamped to
    /// `[0, duration]`.
    ///
    /// A wall clock that moved backwards yields zero rather than a negative
    /// value.
    #[must_use]
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        let seconds = (now - self.started_at).num_seconds().max(0);
        u64::try_from(seconds)
            .unwrap_or(0)
            .min(self.duration_seconds())
    }
}

/// Change notification emitted by the store after every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CycleEvent {
    /// A new cycle became active.
    Created { cycle: Cycle },

    /// The elapsed-seconds cache of the active cycle changed.
    Elapsed {
        #[serde(rename = "cycleId")]
        cycle_id: CycleId,
        seconds: u64,
    },

    /// The active cycle ran for its full duration.
    Finished { cycle: Cycle },

    /// The active cycle was stopped early.
    Interrupted { cycle: Cycle },
}

impl CycleEvent {
    /// Id of the cycle this event concerns.
    #[must_use]
    pub fn cycle_id(&self) -> CycleId {
        match self {
            Self::Created { cycle } | Self::Finished { cycle } | Self::Interrupted { cycle } => {
                cycle.id
            }
            Self::Elapsed { cycle_id, .. } => *cycle_id,
        }
    }

    /// Returns true if this event ends the cycle it concerns.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Interrupted { .. })
    }
}

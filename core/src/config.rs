//! Configuration for the focus timer engine.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `FOCUS_TIMER_TICK_MS` | No | 1000 | Countdown tick period in milliseconds (50-60000) |
//! | `FOCUS_TIMER_EVENT_CAPACITY` | No | 1000 | Change-event channel capacity |
//! | `FOCUS_TIMER_DEFAULT_MINUTES` | No | 25 | Duration prefilled in new-cycle forms (1-60) |
//!
//! # Example
//!
//! ```no_run
//! use focus_timer_core::config::TimerConfig;
//!
//! let config = TimerConfig::from_env().expect("Failed to load configuration");
//! println!("Tick every {:?}", config.tick_rate);
//! ```

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::broadcast::DEFAULT_CHANNEL_CAPACITY;
use crate::types::{MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};

/// Default countdown tick period.
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Default duration offered for a new cycle.
pub const DEFAULT_MINUTES: u32 = 25;

const MIN_TICK_MS: u64 = 50;
const MAX_TICK_MS: u64 = 60_000;

const TICK_MS_VAR: &str = "FOCUS_TIMER_TICK_MS";
const EVENT_CAPACITY_VAR: &str = "FOCUS_TIMER_EVENT_CAPACITY";
const DEFAULT_MINUTES_VAR: &str = "FOCUS_TIMER_DEFAULT_MINUTES";

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    /// How often the countdown driver re-reads the clock.
    pub tick_rate: Duration,

    /// Capacity of the store's change-event channel.
    pub event_capacity: usize,

    /// Duration prefilled in new-cycle forms.
    pub default_minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(DEFAULT_TICK_MS),
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
            default_minutes: DEFAULT_MINUTES,
        }
    }
}

impl TimerConfig {
    /// Builds a configuration from `FOCUS_TIMER_*` environment variables,
    /// falling back to defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but does not
    /// parse or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let tick_ms = parse_var(TICK_MS_VAR, DEFAULT_TICK_MS, MIN_TICK_MS..=MAX_TICK_MS)?;
        let event_capacity = parse_var(EVENT_CAPACITY_VAR, DEFAULT_CHANNEL_CAPACITY, 1..=usize::MAX)?;
        let default_minutes = parse_var(
            DEFAULT_MINUTES_VAR,
            DEFAULT_MINUTES,
            MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES,
        )?;

        Ok(Self {
            tick_rate: Duration::from_millis(tick_ms),
            event_capacity,
            default_minutes,
        })
    }

    /// Overrides the tick period (builder pattern).
    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }
}

/// Parses `key` as a `T` within `range`, or returns `default` when unset.
fn parse_var<T>(key: &str, default: T, range: std::ops::RangeInclusive<T>) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };

    let value = raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected integer, got '{raw}'"),
    })?;

    if !range.contains(&value) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!(
                "must be between {} and {}, got {value}",
                range.start(),
                range.end()
            ),
        });
    }

    Ok(value)
}

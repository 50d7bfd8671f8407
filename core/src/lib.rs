//! Focus Timer Core - cycle lifecycle engine.
//!
//! This crate tracks timed focus cycles: a task name and a duration that count
//! down until they expire or are interrupted.
//!
//! # Architecture
//!
//! - [`CycleStore`] owns the cycle history and the identity of the single
//!   active cycle. All mutation goes through it, and every mutation publishes
//!   a [`CycleEvent`].
//! - [`CountdownDriver`] subscribes to those events, reads the clock on a
//!   fixed tick while a cycle is active, and finishes the cycle at expiry.
//!
//! Nothing here is global: construct a store per session and hand clones to
//! the driver and to the presentation layer.
//!
//! # Modules
//!
//! - [`types`]: Cycle, identifiers, events and the new-cycle payload
//! - [`store`]: The cycle store
//! - [`driver`]: Countdown tick logic, tickers and the driver task
//! - [`broadcast`]: Change-event fan-out
//! - [`clock`]: System and manual clocks
//! - [`display`]: Remaining-time and title formatting
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod display;
pub mod driver;
pub mod error;
pub mod store;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, TimerConfig};
pub use driver::{CountdownDriver, DriverHandle, DriverState};
pub use error::{CycleError, Result, TimerError, ValidationError};
pub use store::{CycleStore, TickOutcome};
pub use types::{Cycle, CycleEvent, CycleId, CycleStatus, NewCycle};

//! Focus Timer - terminal front-end for the focus cycle engine.
//!
//! Two ways to run a cycle on top of [`focus_timer_core`]:
//!
//! - [`tui`]: an interactive screen with the new-cycle form, a large
//!   countdown and the cycle history
//! - [`headless`]: a single cycle with progress in the logs and a summary
//!   at the end
//!
//! # Modules
//!
//! - [`tui`]: Terminal user interface
//! - [`headless`]: Single-cycle runner
//! - [`error`]: Error types for front-end operations

pub mod error;
pub mod headless;
pub mod tui;

pub use error::{AppError, FormError, Result};
pub use headless::{run_cycle, write_summary, CycleSummary};

//! Interactive terminal front-end.
//!
//! - [`app`]: form and application state, key handling, terminal events
//! - [`ui`]: screen layout
//! - [`widgets`]: form, countdown and history widgets
//! - [`terminal`]: raw-mode terminal wrapper and panic hook

pub mod app;
pub mod terminal;
pub mod ui;
pub mod widgets;

pub use app::{AppState, Command, CycleFormState, EventHandler, FormField, Theme, TuiEvent};
pub use terminal::{install_panic_hook, Tui};

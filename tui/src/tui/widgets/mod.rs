//! Widgets for the Focus Timer screen.
//!
//! - [`cycle_form`]: task and minutes inputs with the start/interrupt button
//! - [`countdown`]: large `MM:SS` remaining time
//! - [`history`]: table of every cycle
//!
//! Widgets are stateless; they borrow from [`AppState`](crate::tui::app::AppState).

pub mod countdown;
pub mod cycle_form;
pub mod history;

pub use countdown::{big_text, CountdownWidget, COUNTDOWN_HEIGHT};
pub use cycle_form::{CycleFormWidget, FORM_HEIGHT};
pub use history::{started_ago, HistoryWidget};

/// Buffer contents as text, one line per row.
#[cfg(test)]
pub(crate) fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let width = usize::from(buf.area.width.max(1));
    buf.content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

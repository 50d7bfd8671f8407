//! Read-model helpers for rendering a countdown.

use crate::types::Cycle;

/// Application name shown when no cycle is running.
pub const APP_TITLE: &str = "Focus Timer";

/// Seconds left on `cycle` given `elapsed` seconds, never negative.
#[must_use]
pub fn remaining_seconds(cycle: &Cycle, elapsed: u64) -> u64 {
    cycle.duration_seconds().saturating_sub(elapsed)
}

/// Formats seconds as zero-padded `MM:SS`.
///
/// Minutes are not wrapped into hours; a full 60-minute cycle shows `60:00`.
///
/// ```
/// use focus_timer_core::display::format_mm_ss;
///
/// assert_eq!(format_mm_ss(0), "00:00");
/// assert_eq!(format_mm_ss(1500), "25:00");
/// assert_eq!(format_mm_ss(61), "01:01");
/// ```
#[must_use]
pub fn format_mm_ss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Window or tab title: the remaining time and task while a cycle runs,
/// the application name otherwise.
#[must_use]
pub fn window_title(active: Option<(&Cycle, u64)>) -> String {
    match active {
        Some((cycle, elapsed)) => format!(
            "{} | {}",
            format_mm_ss(remaining_seconds(cycle, elapsed)),
            cycle.task
        ),
        None => APP_TITLE.to_string(),
    }
}

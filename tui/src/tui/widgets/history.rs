//! History table: every cycle, newest first.

use chrono::{DateTime, Utc};
use focus_timer_core::Cycle;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::tui::app::Theme;

/// Human-friendly distance from `started` to `now`.
///
/// ```
/// use chrono::{Duration, Utc};
/// use focus_timer::tui::widgets::history::started_ago;
///
/// let now = Utc::now();
/// assert_eq!(started_ago(now - Duration::minutes(3), now), "3 minutes ago");
/// ```
#[must_use]
pub fn started_ago(started: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - started).num_seconds().max(0);
    let (amount, unit) = match seconds {
        0..=59 => return "just now".to_string(),
        60..=3_599 => (seconds / 60, "minute"),
        3_600..=86_399 => (seconds / 3_600, "hour"),
        _ => (seconds / 86_400, "day"),
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

/// Widget listing cycles with task, duration, start and status.
#[derive(Debug)]
pub struct HistoryWidget<'a> {
    cycles: &'a [Cycle],
    now: DateTime<Utc>,
    theme: &'a Theme,
}

impl<'a> HistoryWidget<'a> {
    /// Creates a table over `cycles` (creation order); `now` anchors the
    /// relative start times.
    #[must_use]
    pub fn new(cycles: &'a [Cycle], now: DateTime<Utc>, theme: &'a Theme) -> Self {
        Self { cycles, now, theme }
    }
}

impl Widget for HistoryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" History ")
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);

        if self.cycles.is_empty() {
            Paragraph::new("No cycles yet.")
                .style(self.theme.text_muted)
                .block(block)
                .render(area, buf);
            return;
        }

        let rows = self.cycles.iter().rev().map(|cycle| {
            let status = cycle.status();
            Row::new(vec![
                Cell::from(cycle.task.clone()),
                Cell::from(format!("{} min", cycle.duration_minutes)),
                Cell::from(started_ago(cycle.started_at, self.now)),
                Cell::from(status.label()).style(self.theme.status(status)),
            ])
        });

        let header = Row::new(vec!["Task", "Duration", "Started", "Status"])
            .style(self.theme.table_header);

        Table::new(
            rows,
            [
                Constraint::Min(12),
                Constraint::Length(9),
                Constraint::Length(16),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .block(block)
        .render(area, buf);
    }
}

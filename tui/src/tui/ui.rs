//! Screen composition.
//!
//! ```text
//! ┌ New cycle ┐   form (locked while a cycle runs)
//! ┌ task ─────┐   large countdown
//! ┌ History ──┐   table, fills the remaining space
//!  key hints or the last notice
//! ```

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::AppState;
use crate::tui::widgets::{CountdownWidget, CycleFormWidget, HistoryWidget, COUNTDOWN_HEIGHT, FORM_HEIGHT};

const IDLE_HINTS: &str = "Tab switch field · Enter start · ↑/↓ or +/- minutes · Esc quit";
const LOCKED_HINTS: &str = "i interrupt · Esc quit";

/// Renders the whole screen; `now` anchors relative times in the history.
pub fn render(frame: &mut Frame, state: &AppState, now: DateTime<Utc>) {
    let [form_area, countdown_area, history_area, footer_area] = Layout::vertical([
        Constraint::Length(FORM_HEIGHT),
        Constraint::Length(COUNTDOWN_HEIGHT),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        CycleFormWidget::new(&state.form, &state.theme, state.is_locked()),
        form_area,
    );
    frame.render_widget(
        CountdownWidget::new(state.active.as_ref(), &state.theme),
        countdown_area,
    );
    frame.render_widget(
        HistoryWidget::new(&state.history, now, &state.theme),
        history_area,
    );
    render_footer(frame, state, footer_area);
}

fn render_footer(frame: &mut Frame, state: &AppState, area: Rect) {
    let line = match &state.notice {
        Some(notice) => Line::from(Span::styled(notice.as_str(), state.theme.input_error)),
        None if state.is_locked() => Line::from(Span::styled(LOCKED_HINTS, state.theme.text_muted)),
        None => Line::from(Span::styled(IDLE_HINTS, state.theme.text_muted)),
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::buffer_text;
    use focus_timer_core::{CycleStore, ManualClock, NewCycle};
    use crate::tui::app::Command;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn draw(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|frame| render(frame, state, Utc::now()))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn idle_screen_shows_form_and_hints() {
        let text = draw(&AppState::new(25));
        assert!(text.contains("New cycle"));
        assert!(text.contains("No active cycle"));
        assert!(text.contains("No cycles yet."));
        assert!(text.contains("Enter start"));
    }

    #[test]
    fn running_screen_shows_interrupt_hint() {
        let store = CycleStore::new(Arc::new(ManualClock::default()));
        let mut state = AppState::new(25);
        state.dispatch(Command::Start(NewCycle::new("Write report", 25)), &store);

        let text = draw(&state);
        assert!(text.contains("[ Interrupt (i) ]"));
        assert!(text.contains("i interrupt"));
        assert!(text.contains("Write report"));
        assert!(text.contains("in progress"));
    }

    #[test]
    fn notice_replaces_hints() {
        let mut state = AppState::new(25);
        state.notice = Some("cycle cyc_000001 is already active".to_string());
        let text = draw(&state);
        assert!(text.contains("already active"));
        assert!(!text.contains("Enter start"));
    }

    #[test]
    fn renders_in_small_terminal_without_panic() {
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        terminal
            .draw(|frame| render(frame, &AppState::new(25), Utc::now()))
            .unwrap();
    }
}

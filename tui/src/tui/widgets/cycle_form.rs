//! New-cycle form widget.
//!
//! Renders the task and minutes inputs as a single sentence, a validation
//! line and the action button:
//!
//! ```text
//! ┌ New cycle ─────────────────────────────────────────┐
//! │ I'm going to work on Write report█ for 25 minutes. │
//! │ enter a task                                        │
//! │                    [ Start ]                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! While a cycle is active the inputs are dimmed and the button becomes
//! `[ Interrupt (i) ]`.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::tui::app::{CycleFormState, FormField, Theme};

/// Rows the form occupies, borders included.
pub const FORM_HEIGHT: u16 = 5;

/// Placeholder shown in an empty task field.
const TASK_PLACEHOLDER: &str = "give your task a name";

/// Widget for rendering the new-cycle form.
#[derive(Debug)]
pub struct CycleFormWidget<'a> {
    state: &'a CycleFormState,
    theme: &'a Theme,
    locked: bool,
}

impl<'a> CycleFormWidget<'a> {
    /// Creates a form widget; `locked` is true while a cycle is active.
    #[must_use]
    pub fn new(state: &'a CycleFormState, theme: &'a Theme, locked: bool) -> Self {
        Self {
            state,
            theme,
            locked,
        }
    }

    fn field_style(&self, field: FormField) -> Style {
        if !self.locked && self.state.focused_field == field {
            self.theme.input_focused
        } else {
            self.theme.input_unfocused
        }
    }

    fn cursor(&self, field: FormField) -> &'static str {
        if !self.locked && self.state.focused_field == field {
            "█"
        } else {
            ""
        }
    }

    fn sentence(&self) -> Line<'a> {
        let task = if self.state.task.is_empty() && self.state.focused_field != FormField::Task {
            Span::styled(TASK_PLACEHOLDER, self.theme.text_muted)
        } else {
            Span::styled(
                format!("{}{}", self.state.task, self.cursor(FormField::Task)),
                self.field_style(FormField::Task),
            )
        };

        Line::from(vec![
            Span::raw("I'm going to work on "),
            task,
            Span::raw(" for "),
            Span::styled(
                format!("{}{}", self.state.minutes, self.cursor(FormField::Minutes)),
                self.field_style(FormField::Minutes),
            ),
            Span::raw(" minutes."),
        ])
    }

    fn button(&self) -> Span<'static> {
        if self.locked {
            Span::styled("[ Interrupt (i) ]", self.theme.button)
        } else if self.state.can_submit() {
            Span::styled("[ Start ]", self.theme.button)
        } else {
            Span::styled("[ Start ]", self.theme.button_disabled)
        }
    }
}

impl Widget for CycleFormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.locked {
            self.theme.border
        } else {
            self.theme.border_focused
        };
        let block = Block::default()
            .title(" New cycle ")
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        Paragraph::new(self.sentence()).render(rows[0], buf);

        if let Some(error) = self.state.error {
            Paragraph::new(error.to_string())
                .style(self.theme.input_error)
                .render(rows[1], buf);
        }

        Paragraph::new(Line::from(self.button()))
            .alignment(Alignment::Center)
            .render(rows[2], buf);
    }
}

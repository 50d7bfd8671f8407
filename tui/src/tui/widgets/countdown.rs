//! Large `MM:SS` countdown.
//!
//! Digits are drawn from a 3x5 block font. When the area is too small for
//! the large digits the plain `MM:SS` text is shown instead.

use focus_timer_core::display::{format_mm_ss, remaining_seconds};
use focus_timer_core::Cycle;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::tui::app::Theme;

/// Rows of one large glyph.
pub const GLYPH_HEIGHT: u16 = 5;

/// Rows the countdown panel wants, borders and padding included.
pub const COUNTDOWN_HEIGHT: u16 = GLYPH_HEIGHT + 4;

fn glyph(c: char) -> [&'static str; GLYPH_HEIGHT as usize] {
    match c {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => ["  █", "  █", "  █", "  █", "  █"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", "███", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", "  █", "  █"],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        ':' => [" ", "█", " ", "█", " "],
        _ => ["   ", "   ", "   ", "   ", "   "],
    }
}

/// Renders `text` in the block font, one string per row.
#[must_use]
pub fn big_text(text: &str) -> Vec<String> {
    (0..GLYPH_HEIGHT as usize)
        .map(|row| {
            text.chars()
                .map(|c| glyph(c)[row])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Widget showing the time left on the active cycle, or `00:00` when idle.
#[derive(Debug)]
pub struct CountdownWidget<'a> {
    active: Option<&'a (Cycle, u64)>,
    theme: &'a Theme,
}

impl<'a> CountdownWidget<'a> {
    /// Creates a countdown for the active cycle and its elapsed seconds.
    #[must_use]
    pub fn new(active: Option<&'a (Cycle, u64)>, theme: &'a Theme) -> Self {
        Self { active, theme }
    }

    fn remaining(&self) -> u64 {
        self.active
            .map_or(0, |(cycle, elapsed)| remaining_seconds(cycle, *elapsed))
    }
}

impl Widget for CountdownWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, style) = match self.active {
            Some((cycle, _)) => (format!(" {} ", cycle.task), self.theme.countdown_active),
            None => (" No active cycle ".to_string(), self.theme.countdown_idle),
        };
        let block = Block::default()
            .title(title)
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(area);
        block.render(area, buf);

        let text = format_mm_ss(self.remaining());
        let rows = big_text(&text);
        let big_width = rows.first().map_or(0, |r| r.chars().count()) as u16;

        if inner.height < GLYPH_HEIGHT || inner.width < big_width {
            Paragraph::new(text)
                .style(style)
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        }

        let top = inner.y + (inner.height - GLYPH_HEIGHT) / 2;
        let digits_area = Rect::new(inner.x, top, inner.width, GLYPH_HEIGHT);
        Paragraph::new(rows.into_iter().map(Line::from).collect::<Vec<_>>())
            .style(style)
            .alignment(Alignment::Center)
            .render(digits_area, buf);
    }
}

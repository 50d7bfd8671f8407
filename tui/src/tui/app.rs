//! Application state and event handling for the Focus Timer TUI.
//!
//! This module holds everything the interactive screen needs between frames:
//!
//! - [`CycleFormState`]: the new-cycle form (task and minutes inputs)
//! - [`AppState`]: the form plus a read model of the store (active cycle,
//!   elapsed seconds, history) and the quit flag
//! - [`Command`]: what a key press asks the store to do
//! - [`EventHandler`]: the async loop that turns terminal input and a
//!   redraw interval into [`TuiEvent`]s
//!
//! Key handling is split in two so it can be tested without a terminal:
//! [`AppState::handle_key`] maps a key to an optional [`Command`], and
//! [`AppState::dispatch`] applies that command to a [`CycleStore`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use focus_timer_core::config::DEFAULT_MINUTES;
use focus_timer_core::display::window_title;
use focus_timer_core::types::{MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use focus_timer_core::{Cycle, CycleError, CycleEvent, CycleStatus, CycleStore, NewCycle};
use ratatui::style::{Color, Modifier, Style};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::FormError;

/// Step used by the minutes adjust keys.
pub const MINUTES_STEP: u32 = 5;

/// Largest value the minutes field accepts while typing.
///
/// Anything above [`MAX_DURATION_MINUTES`] is still rejected on submit; this
/// only keeps the field from growing without bound.
const MINUTES_INPUT_CAP: u32 = 999;

// =============================================================================
// New-cycle form
// =============================================================================

/// Which form input receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    /// Task name input.
    #[default]
    Task,
    /// Duration input in minutes.
    Minutes,
}

impl FormField {
    /// The other field.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Task => Self::Minutes,
            Self::Minutes => Self::Task,
        }
    }
}

/// State of the new-cycle form.
///
/// # Example
///
/// ```
/// use focus_timer::tui::app::CycleFormState;
///
/// let mut form = CycleFormState::new(25);
/// assert!(!form.can_submit());
///
/// form.task = "Write report".to_string();
/// form.increase_minutes();
/// let request = form.submission().unwrap();
/// assert_eq!(request.minutes_amount, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleFormState {
    /// Task input value.
    pub task: String,

    /// Minutes input value.
    pub minutes: u32,

    /// Field receiving input.
    pub focused_field: FormField,

    /// Validation message from the last submit attempt.
    pub error: Option<FormError>,

    /// Value `minutes` returns to on reset.
    default_minutes: u32,
}

impl Default for CycleFormState {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTES)
    }
}

impl CycleFormState {
    /// Creates an empty form prefilled with `default_minutes`.
    #[must_use]
    pub fn new(default_minutes: u32) -> Self {
        Self {
            task: String::new(),
            minutes: default_minutes,
            focused_field: FormField::default(),
            error: None,
            default_minutes,
        }
    }

    /// Submit stays disabled until a task has been entered.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.task.trim().is_empty()
    }

    /// Raises the minutes by [`MINUTES_STEP`], stopping at the maximum.
    pub fn increase_minutes(&mut self) {
        self.minutes = self
            .minutes
            .saturating_add(MINUTES_STEP)
            .min(MAX_DURATION_MINUTES);
        self.error = None;
    }

    /// Lowers the minutes by [`MINUTES_STEP`], stopping at the minimum.
    pub fn decrease_minutes(&mut self) {
        self.minutes = self
            .minutes
            .saturating_sub(MINUTES_STEP)
            .max(MIN_DURATION_MINUTES);
        self.error = None;
    }

    /// Moves input focus to the other field.
    pub fn focus_next(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    /// Types a character into the focused field.
    ///
    /// The minutes field only accepts digits.
    pub fn push_char(&mut self, c: char) {
        match self.focused_field {
            FormField::Task => self.task.push(c),
            FormField::Minutes => {
                let Some(digit) = c.to_digit(10) else {
                    return;
                };
                self.minutes = self
                    .minutes
                    .saturating_mul(10)
                    .saturating_add(digit)
                    .min(MINUTES_INPUT_CAP);
            }
        }
        self.error = None;
    }

    /// Deletes the last character of the focused field.
    pub fn backspace(&mut self) {
        match self.focused_field {
            FormField::Task => {
                self.task.pop();
            }
            FormField::Minutes => self.minutes /= 10,
        }
        self.error = None;
    }

    /// Builds the request this form would submit.
    ///
    /// # Errors
    ///
    /// Returns the [`FormError`] to display when the input is invalid.
    pub fn submission(&self) -> Result<NewCycle, FormError> {
        let request = NewCycle::new(self.task.trim(), self.minutes);
        request.validate()?;
        Ok(request)
    }

    /// Clears the form back to its initial state.
    pub fn reset(&mut self) {
        *self = Self::new(self.default_minutes);
    }
}

// =============================================================================
// Theme
// =============================================================================

/// Styles used across the screen.
///
/// [`Theme::from_env`] honors the [NO_COLOR](https://no-color.org/)
/// convention and falls back to [`Theme::monochrome`].
#[derive(Debug, Clone)]
pub struct Theme {
    // Countdown
    /// Digits while a cycle is running.
    pub countdown_active: Style,
    /// Digits while idle.
    pub countdown_idle: Style,

    // History
    /// In-progress status cell.
    pub status_in_progress: Style,
    /// Interrupted status cell.
    pub status_interrupted: Style,
    /// Finished status cell.
    pub status_finished: Style,
    /// Table header row.
    pub table_header: Style,

    // Form
    /// Focused input field.
    pub input_focused: Style,
    /// Unfocused input field.
    pub input_unfocused: Style,
    /// Validation messages.
    pub input_error: Style,
    /// Enabled start or interrupt button.
    pub button: Style,
    /// Disabled start button.
    pub button_disabled: Style,

    // Layout
    /// Unfocused borders.
    pub border: Style,
    /// Focused borders.
    pub border_focused: Style,
    /// Titles.
    pub title: Style,
    /// Key hints and other secondary text.
    pub text_muted: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            countdown_active: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            countdown_idle: Style::default().fg(Color::DarkGray),

            status_in_progress: Style::default().fg(Color::Yellow),
            status_interrupted: Style::default().fg(Color::Red),
            status_finished: Style::default().fg(Color::Green),
            table_header: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            input_focused: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            input_unfocused: Style::default().fg(Color::Gray),
            input_error: Style::default().fg(Color::Red),
            button: Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            button_disabled: Style::default().fg(Color::DarkGray),

            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Cyan),
            title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            text_muted: Style::default().fg(Color::DarkGray),
        }
    }
}

impl Theme {
    /// A theme built from modifiers only.
    #[must_use]
    pub fn monochrome() -> Self {
        Self {
            countdown_active: Style::default().add_modifier(Modifier::BOLD),
            countdown_idle: Style::default().add_modifier(Modifier::DIM),

            status_in_progress: Style::default().add_modifier(Modifier::ITALIC),
            status_interrupted: Style::default().add_modifier(Modifier::DIM),
            status_finished: Style::default().add_modifier(Modifier::BOLD),
            table_header: Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),

            input_focused: Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            input_unfocused: Style::default().add_modifier(Modifier::DIM),
            input_error: Style::default().add_modifier(Modifier::BOLD),
            button: Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
            button_disabled: Style::default().add_modifier(Modifier::DIM),

            border: Style::default(),
            border_focused: Style::default().add_modifier(Modifier::BOLD),
            title: Style::default().add_modifier(Modifier::BOLD),
            text_muted: Style::default().add_modifier(Modifier::DIM),
        }
    }

    /// [`Theme::monochrome`] when `NO_COLOR` is set, the default otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        if std::env::var("NO_COLOR").is_ok() {
            Self::monochrome()
        } else {
            Self::default()
        }
    }

    /// Style for a status cell in the history table.
    #[must_use]
    pub fn status(&self, status: CycleStatus) -> Style {
        match status {
            CycleStatus::InProgress => self.status_in_progress,
            CycleStatus::Interrupted => self.status_interrupted,
            CycleStatus::Finished => self.status_finished,
        }
    }
}

// =============================================================================
// Application state
// =============================================================================

/// Store operation requested by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a cycle from the form.
    Start(NewCycle),
    /// Interrupt the active cycle.
    Interrupt,
    /// Leave the application.
    Quit,
}

/// Everything the screen renders.
///
/// `active` and `history` are a read model of the [`CycleStore`], kept
/// current by [`AppState::apply_event`] and refreshed wholesale by
/// [`AppState::sync`].
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// New-cycle form.
    pub form: CycleFormState,

    /// Active cycle and its elapsed seconds.
    pub active: Option<(Cycle, u64)>,

    /// All cycles in creation order.
    pub history: Vec<Cycle>,

    /// One-line message about the last failed command.
    pub notice: Option<String>,

    /// Flag indicating the user requested exit.
    pub should_quit: bool,

    /// Theme configuration.
    pub theme: Theme,
}

impl AppState {
    /// Creates a state with an empty history and the given form default.
    #[must_use]
    pub fn new(default_minutes: u32) -> Self {
        Self {
            form: CycleFormState::new(default_minutes),
            ..Self::default()
        }
    }

    /// Replaces the theme (builder pattern).
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// The form is locked while a cycle is active.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.active.is_some()
    }

    /// Returns `true` if the application should quit.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Signals that the application should quit.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Terminal window title for the current state.
    #[must_use]
    pub fn title(&self) -> String {
        window_title(self.active.as_ref().map(|(cycle, elapsed)| (cycle, *elapsed)))
    }

    /// Reloads the read model from `store`.
    pub fn sync(&mut self, store: &CycleStore) {
        self.active = store.active_with_elapsed();
        self.history = store.history();
    }

    /// Folds one change event into the read model.
    ///
    /// Events may repeat what [`AppState::sync`] already loaded, so every
    /// branch is idempotent.
    pub fn apply_event(&mut self, event: &CycleEvent) {
        match event {
            CycleEvent::Created { cycle } => {
                self.upsert(cycle);
                self.active = Some((cycle.clone(), 0));
            }
            CycleEvent::Elapsed { cycle_id, seconds } => {
                if let Some((cycle, elapsed)) = self.active.as_mut() {
                    if cycle.id == *cycle_id {
                        *elapsed = (*elapsed).max(*seconds);
                    }
                }
            }
            CycleEvent::Finished { cycle } | CycleEvent::Interrupted { cycle } => {
                self.upsert(cycle);
                if self.active.as_ref().is_some_and(|(c, _)| c.id == cycle.id) {
                    self.active = None;
                }
            }
        }
    }

    fn upsert(&mut self, cycle: &Cycle) {
        match self.history.binary_search_by_key(&cycle.id, |c| c.id) {
            Ok(index) => self.history[index] = cycle.clone(),
            Err(index) => self.history.insert(index, cycle.clone()),
        }
    }

    /// Maps a key press to a command, editing the form along the way.
    ///
    /// While a cycle is active the form ignores input and `i` is the only
    /// command besides quitting.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return Some(Command::Quit);
        }

        if self.is_locked() {
            return match key.code {
                KeyCode::Char('i' | 'I') => Some(Command::Interrupt),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => self.form.focus_next(),
            KeyCode::Enter => return self.submit(),
            KeyCode::Up => self.form.increase_minutes(),
            KeyCode::Down => self.form.decrease_minutes(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char('+' | '=') if self.form.focused_field == FormField::Minutes => {
                self.form.increase_minutes();
            }
            KeyCode::Char('-') if self.form.focused_field == FormField::Minutes => {
                self.form.decrease_minutes();
            }
            KeyCode::Char(c) if !ctrl => self.form.push_char(c),
            _ => {}
        }
        None
    }

    fn submit(&mut self) -> Option<Command> {
        if !self.form.can_submit() {
            self.form.error = Some(FormError::EmptyTask);
            return None;
        }
        match self.form.submission() {
            Ok(request) => Some(Command::Start(request)),
            Err(err) => {
                self.form.error = Some(err);
                None
            }
        }
    }

    /// Applies a command to the store and refreshes the read model.
    pub fn dispatch(&mut self, command: Command, store: &CycleStore) {
        match command {
            Command::Quit => self.quit(),
            Command::Interrupt => match store.interrupt() {
                Some(cycle) => {
                    info!(cycle_id = %cycle.id, "Cycle interrupted from the keyboard");
                    self.notice = None;
                }
                None => debug!("Interrupt ignored, no active cycle"),
            },
            Command::Start(request) => match store.create_from(&request) {
                Ok(cycle) => {
                    debug!(cycle_id = %cycle.id, "Cycle started from the form");
                    self.form.reset();
                    self.notice = None;
                }
                Err(CycleError::Validation(err)) => self.form.error = Some(err.into()),
                Err(err) => {
                    warn!(error = %err, "Failed to start cycle");
                    self.notice = Some(err.to_string());
                }
            },
        }
        self.sync(store);
    }
}

// =============================================================================
// Terminal events
// =============================================================================

/// Events consumed by the interactive loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    /// Redraw interval elapsed.
    Tick,

    /// Key press.
    Key(KeyEvent),

    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
}

/// Default redraw interval.
pub const DEFAULT_TICK_RATE_MS: u64 = 250;

/// How long each blocking terminal poll waits for input. Bounds how long the
/// reader thread takes to notice shutdown.
const POLL_TIMEOUT_MS: u64 = 50;

/// Turns terminal input and a redraw interval into [`TuiEvent`]s.
///
/// Runs in its own task until the shutdown signal fires or the receiver is
/// dropped. Crossterm reads are blocking, so a single reader runs on the
/// blocking pool for the handler's whole life and sends input straight into
/// the channel; no read is ever abandoned mid-flight.
///
/// ```ignore
/// let (event_tx, mut event_rx) = mpsc::channel(100);
/// let (shutdown_tx, shutdown_rx) = oneshot::channel();
/// let events = tokio::spawn(EventHandler::new(event_tx, shutdown_rx).run());
///
/// while let Some(event) = event_rx.recv().await { /* ... */ }
///
/// let _ = shutdown_tx.send(());
/// events.await??;
/// ```
#[derive(Debug)]
pub struct EventHandler {
    event_tx: mpsc::Sender<TuiEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    tick_rate: Duration,
}

impl EventHandler {
    /// Creates a handler with [`DEFAULT_TICK_RATE_MS`].
    pub fn new(event_tx: mpsc::Sender<TuiEvent>, shutdown_rx: oneshot::Receiver<()>) -> Self {
        Self::with_tick_rate(
            event_tx,
            shutdown_rx,
            Duration::from_millis(DEFAULT_TICK_RATE_MS),
        )
    }

    /// Creates a handler with a custom redraw interval.
    pub fn with_tick_rate(
        event_tx: mpsc::Sender<TuiEvent>,
        shutdown_rx: oneshot::Receiver<()>,
        tick_rate: Duration,
    ) -> Self {
        Self {
            event_tx,
            shutdown_rx,
            tick_rate,
        }
    }

    /// Returns the configured redraw interval.
    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    /// Runs the event loop until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal reader task panicked.
    pub async fn run(mut self) -> std::io::Result<()> {
        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let event_tx = self.event_tx.clone();
            let stop = Arc::clone(&stop);
            tokio::task::spawn_blocking(move || {
                Self::read_loop(Self::poll_terminal_event, &event_tx, &stop);
            })
        };

        let mut tick_interval = tokio::time::interval(self.tick_rate);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tick_interval.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = &mut self.shutdown_rx => {
                    debug!("EventHandler received shutdown signal");
                    break;
                }

                _ = tick_interval.tick() => {
                    if self.event_tx.send(TuiEvent::Tick).await.is_err() {
                        debug!("Event receiver dropped, exiting event loop");
                        break;
                    }
                }
            }
        }

        stop.store(true, Ordering::Relaxed);
        reader.await.map_err(|join_error| {
            tracing::error!("Terminal reader task panicked: {}", join_error);
            std::io::Error::other("Terminal reader task panicked")
        })
    }

    /// Feeds events from `poll` into `event_tx` until `stop` is set or the
    /// receiver is dropped. Blocks the calling thread.
    fn read_loop<P>(mut poll: P, event_tx: &mpsc::Sender<TuiEvent>, stop: &AtomicBool)
    where
        P: FnMut(Duration) -> Option<TuiEvent>,
    {
        let timeout = Duration::from_millis(POLL_TIMEOUT_MS);
        while !stop.load(Ordering::Relaxed) && !event_tx.is_closed() {
            if let Some(event) = poll(timeout) {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        }
        debug!("Terminal reader stopped");
    }

    /// Polls once for a terminal event.
    ///
    /// Poll failures (no terminal attached, as in CI) count as no event.
    fn poll_terminal_event(timeout: Duration) -> Option<TuiEvent> {
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(crossterm_event) => Self::convert_crossterm_event(crossterm_event),
                Err(e) => {
                    tracing::trace!("Failed to read terminal event: {}", e);
                    None
                }
            },
            Ok(false) => None,
            Err(e) => {
                tracing::trace!("Failed to poll terminal: {}", e);
                // No terminal to wait on; don't spin.
                std::thread::sleep(timeout);
                None
            }
        }
    }

    /// Keeps key and resize events; mouse, focus and paste are dropped.
    fn convert_crossterm_event(event: CrosstermEvent) -> Option<TuiEvent> {
        match event {
            CrosstermEvent::Key(key_event) => Some(TuiEvent::Key(key_event)),
            CrosstermEvent::Resize(cols, rows) => Some(TuiEvent::Resize(cols, rows)),
            CrosstermEvent::Mouse(_)
            | CrosstermEvent::FocusGained
            | CrosstermEvent::FocusLost
            | CrosstermEvent::Paste(_) => None,
        }
    }
}

//! Terminal setup and RAII restoration.
//!
//! [`Tui`] enters raw mode and the alternate screen on creation and leaves
//! both when dropped. [`install_panic_hook`] does the same restoration
//! before a panic message is printed, so the message lands on the normal
//! screen.
//!
//! ```ignore
//! install_panic_hook();
//! let mut tui = Tui::new()?;
//! tui.draw(|frame| ui::render(frame, &state, now))?;
//! // restored when `tui` goes out of scope
//! ```

use std::io::{self, Stdout};
use std::panic;

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};

/// Installs a panic hook that restores the terminal, then delegates to the
/// previous hook.
///
/// Call once at startup, before creating a [`Tui`]. Restoration errors are
/// ignored; the terminal may already be in a bad state.
pub fn install_panic_hook() {
    let previous_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        previous_hook(panic_info);
    }));
}

fn restore_terminal() -> io::Result<()> {
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    disable_raw_mode()
}

/// A ratatui terminal that restores the shell on drop.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Last title sent, to avoid rewriting it every frame.
    title: Option<String>,
    restored: bool,
}

impl Tui {
    /// Enables raw mode, enters the alternate screen and hides the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails; earlier steps are undone first.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(t) => t,
            Err(e) => {
                let _ = restore_terminal();
                return Err(e);
            }
        };

        Ok(Self {
            terminal,
            title: None,
            restored: false,
        })
    }

    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }

    /// Sets the terminal window title when it differs from the last one.
    ///
    /// # Errors
    ///
    /// Returns an error if the escape sequence cannot be written.
    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        if self.title.as_deref() == Some(title) {
            return Ok(());
        }
        execute!(io::stdout(), SetTitle(title))?;
        self.title = Some(title.to_string());
        Ok(())
    }

    /// Restores the terminal now, reporting errors that [`Drop`] would
    /// swallow. Later calls and the drop become no-ops.
    ///
    /// # Errors
    ///
    /// Returns an error if any restoration step fails.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        restore_terminal()
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if !self.restored {
            let _ = restore_terminal();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Creating a Tui needs a real terminal, so these only cover the API.

    #[test]
    fn tui_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Tui>();
    }

    #[test]
    fn install_panic_hook_chains_previous_hook() {
        let original = panic::take_hook();
        install_panic_hook();
        let _ = panic::take_hook();
        panic::set_hook(original);
    }
}

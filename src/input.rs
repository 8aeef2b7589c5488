//! Key handling for the live views.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the live loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the live view.
    Quit,
    /// Save the current figure as a PNG.
    Snapshot,
    /// No action.
    None,
}

/// Maps key events to [`Action`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputHandler;

impl InputHandler {
    /// Handles a key event and returns the corresponding action.
    #[must_use]
    pub fn handle_key(&self, event: KeyEvent) -> Action {
        // Raw mode swallows SIGINT, so Ctrl+C arrives as a key
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c') => Action::Quit,
                _ => Action::None,
            };
        }

        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('s') => Action::Snapshot,
            _ => Action::None,
        }
    }
}

//! Input handling for the TUI.
//!
//! This module handles keyboard input and translates it into application actions.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Actions that can be performed based on user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Quit the application
    Quit,
    /// Pause or resume the poll timer
    TogglePolling,
    /// Run one cycle now
    Refresh,
    /// Toggle help panel
    ToggleHelp,
    /// No action
    None,
}

/// Handle keyboard input and return the corresponding action
pub fn handle_input(timeout: Duration) -> std::io::Result<InputAction> {
    if event::poll(timeout)? {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Press {
                return Ok(map_key_to_action(key_event));
            }
        }
    }
    Ok(InputAction::None)
}

/// Map a key event to an application action
fn map_key_to_action(key_event: KeyEvent) -> InputAction {
    match key_event.code {
        // Quit
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            InputAction::Quit
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => InputAction::Quit,
        KeyCode::Esc => InputAction::Quit,

        // Pause / resume
        KeyCode::Char(' ') => InputAction::TogglePolling,
        KeyCode::Char('p') | KeyCode::Char('P') => InputAction::TogglePolling,

        KeyCode::Char('r') | KeyCode::Char('R') => InputAction::Refresh,

        // Help
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            InputAction::ToggleHelp
        }

        _ => InputAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_quit_actions() {
        assert_eq!(map_key_to_action(key(KeyCode::Char('q'))), InputAction::Quit);
        assert_eq!(map_key_to_action(key(KeyCode::Esc)), InputAction::Quit);
        assert_eq!(
            map_key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            InputAction::Quit
        );
    }

    #[test]
    fn test_polling_controls() {
        assert_eq!(map_key_to_action(key(KeyCode::Char(' '))), InputAction::TogglePolling);
        assert_eq!(map_key_to_action(key(KeyCode::Char('r'))), InputAction::Refresh);
        assert_eq!(map_key_to_action(key(KeyCode::F(1))), InputAction::ToggleHelp);
        assert_eq!(map_key_to_action(key(KeyCode::Char('x'))), InputAction::None);
    }
}

//! Terminal UI module using ratatui.
//!
//! This module provides an interactive terminal interface showing the three
//! readings, with keyboard controls for pausing and refreshing the poller.

pub mod app;
pub mod input;
pub mod widgets;

pub use app::{App, ControlCommand, PanelSurface};
pub use input::{handle_input, InputAction};

use crate::error::{Result, UiError};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    DefaultTerminal, Frame,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Draw the whole screen
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(frame.area());

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[0]);

    // Same order as Target::ALL
    let panel_styles = [
        ("Temperature", Color::Red),
        ("Humidity", Color::Blue),
        ("Fan Speed", Color::Green),
    ];
    let readings = app.readings();
    for (((title, color), reading), area) in panel_styles
        .into_iter()
        .zip(readings.iter())
        .zip(panels.iter())
    {
        widgets::render_reading(frame, *area, title, reading, color);
    }

    widgets::render_status_bar(frame, chunks[1], app);

    if app.show_help {
        widgets::render_help(frame, centered(frame.area(), 50, 16));
    }
}

/// Rectangle of at most `width` x `height` centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Run the UI until the user quits or `shutdown` is set.
///
/// Blocking; call it from a dedicated thread. Commands for the poller are
/// sent over `commands`.
pub fn run(
    mut app: App,
    tick_rate: Duration,
    commands: UnboundedSender<ControlCommand>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let mut terminal =
        ratatui::try_init().map_err(|e| UiError::InitializationError(e.to_string()))?;
    let result = event_loop(&mut terminal, &mut app, tick_rate, &commands, &shutdown);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    tick_rate: Duration,
    commands: &UnboundedSender<ControlCommand>,
    shutdown: &AtomicBool,
) -> Result<()> {
    while !app.should_quit && !shutdown.load(Ordering::SeqCst) {
        terminal
            .draw(|frame| draw(frame, app))
            .map_err(|e| UiError::RenderError(e.to_string()))?;

        let action = handle_input(tick_rate).map_err(|e| UiError::InputError(e.to_string()))?;
        if let Some(command) = app.handle_action(action) {
            if commands.send(command).is_err() {
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::OverlapPolicy;
    use crate::surface::{RenderSurface, Target};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app(surface: Arc<PanelSurface>) -> App {
        App::new(
            surface,
            "http://127.0.0.1/data".to_string(),
            5000,
            OverlapPolicy::default(),
        )
    }

    #[test]
    fn test_draw_shows_rendered_readings() {
        let surface = Arc::new(PanelSurface::new());
        surface.set_text(Target::Temperature, "21.5°C").unwrap();
        surface.set_text(Target::Humidity, "40%").unwrap();
        surface.set_text(Target::FanSpeed, "low").unwrap();

        let mut terminal = Terminal::new(TestBackend::new(120, 16)).unwrap();
        let app = app(surface);
        terminal.draw(|frame| draw(frame, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("21.5°C"));
        assert!(text.contains("40%"));
        assert!(text.contains("low"));
        assert!(text.contains("POLLING"));
    }

    #[test]
    fn test_draw_placeholders_and_help() {
        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
        let mut app = app(Arc::new(PanelSurface::new()));
        app.handle_action(InputAction::ToggleHelp);
        terminal.draw(|frame| draw(frame, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("--"));
        assert!(text.contains("updated never"));
        assert!(text.contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_centered_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered(area, 50, 16);
        assert_eq!(rect, Rect::new(0, 0, 40, 10));
        assert_eq!(centered(Rect::new(0, 0, 100, 40), 50, 16), Rect::new(25, 12, 50, 16));
    }
}

//! Application state management for the TUI.
//!
//! This module manages the UI state and the surface the poller renders into,
//! and translates user input into polling commands.

use crate::error::RenderError;
use crate::poller::OverlapPolicy;
use crate::surface::{MemorySurface, RenderSurface, Target};
use crate::ui::InputAction;
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};

/// Placeholder shown before the first successful cycle
const EMPTY_READING: &str = "--";

/// Surface backing the reading panels
pub struct PanelSurface {
    inner: MemorySurface,
    updated_at: Mutex<Option<DateTime<Local>>>,
}

impl PanelSurface {
    pub fn new() -> Self {
        Self {
            inner: MemorySurface::new(),
            updated_at: Mutex::new(None),
        }
    }

    /// Local time of the last write to any target
    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        *self.updated_at.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for PanelSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for PanelSurface {
    fn has_target(&self, target: Target) -> bool {
        self.inner.has_target(target)
    }

    fn set_text(&self, target: Target, text: &str) -> Result<(), RenderError> {
        self.inner.set_text(target, text)?;
        *self.updated_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(Local::now());
        Ok(())
    }

    fn text(&self, target: Target) -> Option<String> {
        self.inner.text(target)
    }

    fn set_texts(&self, texts: &[(Target, String)]) -> Result<(), RenderError> {
        self.inner.set_texts(texts)?;
        *self.updated_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(Local::now());
        Ok(())
    }

    fn texts(&self) -> [Option<String>; 3] {
        self.inner.texts()
    }
}

/// Commands the UI sends to the polling side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Stop,
    Refresh,
    Quit,
}

/// Application state
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,
    /// Whether the poll timer is running
    pub is_polling: bool,
    /// Show help panel
    pub show_help: bool,
    /// Polled URL
    pub endpoint: String,
    pub interval_ms: u64,
    pub overlap: OverlapPolicy,
    /// Status message
    pub status_message: Option<String>,
    surface: Arc<PanelSurface>,
}

impl App {
    /// Create a new application state
    pub fn new(
        surface: Arc<PanelSurface>,
        endpoint: String,
        interval_ms: u64,
        overlap: OverlapPolicy,
    ) -> Self {
        Self {
            should_quit: false,
            is_polling: true,
            show_help: false,
            endpoint,
            interval_ms,
            overlap,
            status_message: Some("Application started".to_string()),
            surface,
        }
    }

    /// Current text of every reading panel, in `Target::ALL` order.
    ///
    /// Read in one step so a frame never mixes values from two cycles.
    pub fn readings(&self) -> [String; 3] {
        self.surface.texts().map(|text| match text {
            Some(text) if !text.is_empty() => text,
            _ => EMPTY_READING.to_string(),
        })
    }

    /// Time of the last render, formatted for the status bar
    pub fn last_update(&self) -> Option<String> {
        self.surface
            .updated_at()
            .map(|t| t.format("%H:%M:%S").to_string())
    }

    /// Apply a user action, returning the command to forward to the poller
    pub fn handle_action(&mut self, action: InputAction) -> Option<ControlCommand> {
        match action {
            InputAction::Quit => {
                self.should_quit = true;
                Some(ControlCommand::Quit)
            }
            InputAction::TogglePolling => {
                self.is_polling = !self.is_polling;
                self.status_message = Some(format!(
                    "Polling {}",
                    if self.is_polling { "resumed" } else { "paused" }
                ));
                Some(if self.is_polling {
                    ControlCommand::Start
                } else {
                    ControlCommand::Stop
                })
            }
            InputAction::Refresh => {
                self.status_message = Some("Refresh requested".to_string());
                Some(ControlCommand::Refresh)
            }
            InputAction::ToggleHelp => {
                self.show_help = !self.show_help;
                None
            }
            InputAction::None => None,
        }
    }
}

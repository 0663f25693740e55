//! Status bar widget.

use crate::ui::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the status bar
pub fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    // Polling status
    let poll_text = if app.is_polling { "POLLING" } else { "PAUSED" };
    let poll_color = if app.is_polling { Color::Green } else { Color::Yellow };
    spans.push(Span::styled(
        poll_text,
        Style::default().fg(poll_color).add_modifier(Modifier::BOLD),
    ));

    spans.push(Span::raw(" │ "));
    spans.push(Span::styled(
        format!("{} every {} ms ({})", app.endpoint, app.interval_ms, app.overlap),
        Style::default().fg(Color::White),
    ));

    spans.push(Span::raw(" │ "));
    spans.push(Span::styled(
        format!("updated {}", app.last_update().as_deref().unwrap_or("never")),
        Style::default().fg(Color::Gray),
    ));

    if let Some(status) = app.status_message.as_deref() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(status, Style::default().fg(Color::Gray)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

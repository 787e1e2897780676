//! Status bar — bottom line with connection state and keybindings.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::session::SessionState;
use crate::theme::{C_CONNECTING, C_ERROR, C_MUTED, C_PLAYING, C_SEPARATOR};

const KEYS: &str =
    " b/← back  Space play/pause  s/→ skip  ↑↓/jk select  n/Enter more  Tab focus  PgUp/PgDn log  q quit";

/// Label and colour of the connection lamp.
pub fn connection_badge(state: SessionState) -> (&'static str, Color) {
    match state {
        SessionState::Connecting => ("CONNECTING", C_CONNECTING),
        SessionState::Open => ("LIVE", C_PLAYING),
        SessionState::Closed => ("CLOSED", C_ERROR),
    }
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, connection: SessionState) {
    let (label, color) = connection_badge(connection);
    let line = Line::from(vec![
        Span::styled("●", Style::default().fg(color)),
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(KEYS, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

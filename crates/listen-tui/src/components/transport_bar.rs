//! TransportBar — toggle label, current track and the progress bar.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::ComponentId,
    app_state::AppState,
    component::Component,
    theme::{C_ACCENT, C_MUTED, C_PRIMARY},
    widgets::{progress_bar::draw_progress, text::truncate},
};

#[derive(Debug, Default)]
pub struct TransportBar;

impl TransportBar {
    pub fn new() -> Self {
        Self
    }
}

impl Component for TransportBar {
    fn id(&self) -> ComponentId {
        ComponentId::Transport
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let label = format!(" [{}] ", state.transport.label());
        let track_w = (area.width as usize).saturating_sub(label.chars().count() + 1);
        let track = match state.current_track() {
            Some(name) => Span::styled(
                truncate(name, track_w),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            None => Span::styled("no status yet", Style::default().fg(C_MUTED)),
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(label, Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)),
                track,
            ])),
            rows[0],
        );

        let bar_area = Rect {
            x: rows[1].x + 1,
            width: rows[1].width.saturating_sub(2),
            ..rows[1]
        };
        draw_progress(frame, bar_area, state.progress);
    }
}

//! NowPlayingPane — the last few revealed tracks, newest on top.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::ComponentId,
    app_state::AppState,
    component::Component,
    theme::{style_playing, C_MUTED, C_SECONDARY, C_TAG},
    widgets::{pane_chrome::pane_chrome, text::truncate},
};

#[derive(Debug, Default)]
pub struct NowPlayingPane;

impl NowPlayingPane {
    pub fn new() -> Self {
        Self
    }
}

impl Component for NowPlayingPane {
    fn id(&self) -> ComponentId {
        ComponentId::NowPlaying
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("now playing", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if state.now_playing.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  nothing yet", Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }

        let width = inner.width as usize;
        let lines: Vec<Line> = state
            .now_playing
            .entries()
            .rev()
            .enumerate()
            .map(|(i, entry)| {
                let tag = format!(" [{}]", entry.playlist);
                let name_w = width.saturating_sub(tag.chars().count() + 3);
                let name_style = if i == 0 {
                    style_playing().add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(C_SECONDARY)
                };
                Line::from(vec![
                    Span::styled(if i == 0 { " ♪ " } else { "   " }, style_playing()),
                    Span::styled(truncate(&entry.label(), name_w), name_style),
                    Span::styled(tag, Style::default().fg(C_TAG)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

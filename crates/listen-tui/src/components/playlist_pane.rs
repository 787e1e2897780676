//! PlaylistPane — every playlist in the catalog with the tracks revealed so far.
//!
//! One header row per playlist; the selected playlist is expanded with its
//! revealed tracks underneath.  `n` / Enter asks for the next window.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_default, style_selected, style_selected_focused, C_MUTED, C_SECONDARY, C_TAG},
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        text::truncate,
    },
};

#[derive(Debug, Default)]
pub struct PlaylistPane {
    selected: usize,
    scroll: usize,
}

impl PlaylistPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_name<'a>(&self, state: &'a AppState) -> Option<&'a str> {
        state.browser.catalog().names().nth(self.selected)
    }

    fn rows(&self, state: &AppState, width: usize) -> Vec<Line<'static>> {
        let browser = &state.browser;
        let mut rows = Vec::new();
        for (i, playlist) in browser.catalog().playlists().iter().enumerate() {
            let shown = browser.revealed(&playlist.name).len();
            let total = playlist.tracks.len();
            let marker = if i == self.selected { "▾ " } else { "▸ " };
            let count_color = if browser.is_exhausted(&playlist.name) { C_MUTED } else { C_TAG };
            rows.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(C_SECONDARY)),
                Span::styled(playlist.name.clone(), style_default()),
                Span::styled(format!("  {}/{}", shown, total), Style::default().fg(count_color)),
            ]));
            if i == self.selected {
                for track in browser.revealed(&playlist.name) {
                    rows.push(Line::from(Span::styled(
                        format!("    {}", truncate(&track.name, width.saturating_sub(4))),
                        Style::default().fg(C_SECONDARY),
                    )));
                }
            }
        }
        rows
    }

    fn ensure_visible(&mut self, row: usize, height: usize) {
        if height == 0 {
            return;
        }
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + height {
            self.scroll = row + 1 - height;
        }
    }
}

impl Component for PlaylistPane {
    fn id(&self) -> ComponentId {
        ComponentId::Playlists
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => vec![Action::SelectUp(1)],
            KeyCode::Down | KeyCode::Char('j') => vec![Action::SelectDown(1)],
            KeyCode::Home | KeyCode::Char('g') => vec![Action::SelectUp(usize::MAX)],
            KeyCode::End | KeyCode::Char('G') => vec![Action::SelectDown(usize::MAX)],
            KeyCode::Enter | KeyCode::Char('n') => match self.selected_name(state) {
                Some(name) => vec![Action::RevealMore(name.to_string())],
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        let count = state.browser.catalog().len();
        match action {
            Action::SelectUp(n) => {
                self.selected = self.selected.saturating_sub(*n);
            }
            Action::SelectDown(n) => {
                self.selected = self.selected.saturating_add(*n).min(count.saturating_sub(1));
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let catalog = state.browser.catalog();
        let total: usize = catalog.playlists().iter().map(|p| p.tracks.len()).sum();
        let shown: usize = catalog
            .names()
            .map(|name| state.browser.revealed(name).len())
            .sum();
        let badge_text = format!("{}/{}", shown, total);
        let block = pane_chrome(
            "playlists",
            focused,
            Some(Badge {
                text: &badge_text,
                color: C_TAG,
            }),
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if catalog.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  no playlists loaded", Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        // Only the selected playlist is expanded, so its header row index is its position.
        let row = self.selected;
        self.ensure_visible(row, height);

        let width = inner.width as usize;
        let lines: Vec<Line> = self
            .rows(state, width)
            .into_iter()
            .enumerate()
            .skip(self.scroll)
            .take(height)
            .map(|(i, line)| {
                if i != row {
                    return line;
                }
                let pad = width.saturating_sub(line.width());
                let mut line = line;
                line.spans.push(Span::raw(" ".repeat(pad)));
                line.style(if focused { style_selected_focused() } else { style_selected() })
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{CursorMode, PlaylistBrowser};
    use listen_proto::catalog::Catalog;
    use ratatui::crossterm::event::KeyModifiers;

    const TWO: &str = r#"{"Rock":[{"TrackID":1,"TrackName":"A"},{"TrackID":2,"TrackName":"B"}],"Jazz":[{"TrackID":3,"TrackName":"C"}]}"#;

    fn state() -> AppState {
        AppState::new(PlaylistBrowser::new(Catalog::parse(TWO), 3, CursorMode::LastShown))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_reveals_selected_playlist() {
        let state = state();
        let mut pane = PlaylistPane::new();
        assert_eq!(
            pane.handle_key(key(KeyCode::Enter), &state),
            [Action::RevealMore("Rock".into())]
        );
        pane.on_action(&Action::SelectDown(1), &state);
        assert_eq!(
            pane.handle_key(key(KeyCode::Char('n')), &state),
            [Action::RevealMore("Jazz".into())]
        );
    }

    #[test]
    fn selection_is_clamped() {
        let state = state();
        let mut pane = PlaylistPane::new();
        pane.on_action(&Action::SelectDown(usize::MAX), &state);
        assert_eq!(pane.selected(), 1);
        pane.on_action(&Action::SelectUp(5), &state);
        assert_eq!(pane.selected(), 0);
    }

    #[test]
    fn empty_catalog_has_nothing_to_reveal() {
        let state = AppState::new(PlaylistBrowser::new(Catalog::default(), 3, CursorMode::LastShown));
        let mut pane = PlaylistPane::new();
        assert!(pane.handle_key(key(KeyCode::Enter), &state).is_empty());
        pane.on_action(&Action::SelectDown(1), &state);
        assert_eq!(pane.selected(), 0);
    }

    #[test]
    fn scroll_follows_selection() {
        let mut pane = PlaylistPane::new();
        pane.ensure_visible(7, 5);
        assert_eq!(pane.scroll, 3);
        pane.ensure_visible(1, 5);
        assert_eq!(pane.scroll, 1);
    }
}

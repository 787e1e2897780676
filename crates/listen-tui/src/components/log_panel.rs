//! LogPanel component — scrollable view of the display log.
//!
//! Follows the newest line until the user scrolls up; scrolling back to the
//! bottom resumes following.

use std::ops::Range;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    display_log::{LogLine, Severity},
    theme::{C_ERROR, C_MUTED, C_SECONDARY, C_WARNING},
    widgets::pane_chrome::{pane_chrome, Badge},
};

pub struct LogPanel {
    scroll: usize,
    follow: bool,
    /// Inner height from the last draw; scroll math between draws uses it.
    height: usize,
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            scroll: 0,
            follow: true,
            height: 0,
        }
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    fn scroll_up(&mut self, n: usize, total: usize) {
        if self.follow {
            self.scroll = max_scroll(total, self.height);
            self.follow = false;
        }
        self.scroll = self.scroll.saturating_sub(n);
    }

    fn scroll_down(&mut self, n: usize, total: usize) {
        let max = max_scroll(total, self.height);
        self.scroll = self.scroll.saturating_add(n);
        if self.scroll >= max {
            self.scroll = max;
            self.follow = true;
        }
    }
}

fn max_scroll(total: usize, height: usize) -> usize {
    total.saturating_sub(height)
}

/// Indices of the log lines to show for a window of `height` rows starting
/// at `scroll` (clamped so the window never runs past the end).
pub fn visible_range(total: usize, height: usize, scroll: usize) -> Range<usize> {
    let start = scroll.min(max_scroll(total, height));
    start..(start + height).min(total)
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => C_SECONDARY,
        Severity::Warning => C_WARNING,
        Severity::Error => C_ERROR,
    }
}

fn render_line(line: &LogLine) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {} ", line.at.format("%H:%M:%S")),
            Style::default().fg(C_MUTED),
        ),
        Span::styled(line.text(), Style::default().fg(severity_color(line.severity()))),
    ])
}

impl Component for LogPanel {
    fn id(&self) -> ComponentId {
        ComponentId::LogPanel
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => vec![Action::ScrollUp(1)],
            KeyCode::Down | KeyCode::Char('j') => vec![Action::ScrollDown(1)],
            KeyCode::Home | KeyCode::Char('g') => vec![Action::ScrollUp(state.log.len())],
            KeyCode::End | KeyCode::Char('G') => vec![Action::ScrollDown(state.log.len())],
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        let total = state.log.len();
        match action {
            Action::ScrollUp(n) => self.scroll_up(*n, total),
            Action::ScrollDown(n) => self.scroll_down(*n, total),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let total = state.log.len();
        let badge_text = if self.follow { String::new() } else { "PAUSED".to_string() };
        let badge = (!self.follow).then(|| Badge {
            text: &badge_text,
            color: C_WARNING,
        });
        let block = pane_chrome("log", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.height = inner.height as usize;
        if self.follow {
            self.scroll = max_scroll(total, self.height);
        }

        if total == 0 {
            frame.render_widget(
                Paragraph::new(Span::styled("  no log entries yet", Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }

        let range = visible_range(total, self.height, self.scroll);
        self.scroll = range.start;
        let lines: Vec<Line> = state
            .log
            .lines()
            .range(range)
            .map(render_line)
            .collect();
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_clamped_to_the_tail() {
        assert_eq!(visible_range(0, 5, 0), 0..0);
        assert_eq!(visible_range(3, 5, 0), 0..3);
        assert_eq!(visible_range(20, 5, 0), 0..5);
        assert_eq!(visible_range(20, 5, 12), 12..17);
        assert_eq!(visible_range(20, 5, 99), 15..20);
    }

    #[test]
    fn scrolling_up_stops_following() {
        let mut panel = LogPanel::new();
        panel.height = 5;
        panel.scroll_up(2, 20);
        assert!(!panel.is_following());
        assert_eq!(panel.scroll, 13);
        panel.scroll_up(50, 20);
        assert_eq!(panel.scroll, 0);
    }

    #[test]
    fn reaching_the_bottom_resumes_following() {
        let mut panel = LogPanel::new();
        panel.height = 5;
        panel.scroll_up(3, 20);
        panel.scroll_down(1, 20);
        assert!(!panel.is_following());
        panel.scroll_down(10, 20);
        assert!(panel.is_following());
        assert_eq!(panel.scroll, 15);
    }

    #[test]
    fn short_log_always_follows() {
        let mut panel = LogPanel::new();
        panel.height = 10;
        panel.scroll_up(1, 4);
        assert_eq!(panel.scroll, 0);
        panel.scroll_down(1, 4);
        assert!(panel.is_following());
    }
}

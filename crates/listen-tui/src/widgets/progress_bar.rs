//! Smooth Unicode progress bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::progress::ProgressReading;
use crate::theme::{C_MUTED, C_PLAYING, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Render the playback bar in `area`.  Without a reading the bar is drawn
/// empty with a `--%` label.
pub fn draw_progress(frame: &mut Frame, area: Rect, reading: Option<ProgressReading>) {
    if area.width < 4 || area.height == 0 {
        return;
    }

    let label = reading
        .map(|r| r.percent_label())
        .unwrap_or_else(|| "--%".to_string());
    let bar_w = area.width.saturating_sub(label.len() as u16 + 1).max(4) as usize;
    let fill = reading.map(|r| r.value() / r.max()).unwrap_or(0.0);

    let spans = vec![
        Span::styled(bar_cells(fill, bar_w), Style::default().fg(C_PLAYING)),
        Span::styled(
            format!(" {}", label),
            Style::default().fg(if reading.is_some() { C_SECONDARY } else { C_MUTED }),
        ),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// `fill` (0.0..=1.0) of `width` cells, in eighth-block resolution.
fn bar_cells(fill: f64, width: usize) -> String {
    let eighths = (fill.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full_blocks = eighths / 8;
    let partial = eighths % 8;

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..full_blocks.min(width) {
        bar.push('█');
    }
    if full_blocks < width {
        bar.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            bar.push(' ');
        }
    }
    bar
}

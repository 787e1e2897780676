//! DisplayLog — the append-only log shown in the log pane.
//!
//! Holds timestamped notices (connection closed, decode failures, …) and a
//! snapshot of the now-playing buffer after every append.  Scrolling lives in
//! `LogPanel`; this type only stores lines.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::now_playing::NowPlayingEntry;

/// Oldest lines are dropped past this many.
pub const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Notice { severity: Severity, text: String },
    /// The now-playing buffer as it looked right after an append, oldest first.
    NowPlaying(Vec<NowPlayingEntry>),
}

#[derive(Debug, Clone)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub entry: LogEntry,
}

impl LogLine {
    pub fn severity(&self) -> Severity {
        match &self.entry {
            LogEntry::Notice { severity, .. } => *severity,
            LogEntry::NowPlaying(_) => Severity::Info,
        }
    }

    /// Body text without the timestamp.
    pub fn text(&self) -> String {
        match &self.entry {
            LogEntry::Notice { text, .. } => text.clone(),
            LogEntry::NowPlaying(entries) => {
                let labels: Vec<String> = entries.iter().map(NowPlayingEntry::label).collect();
                format!("now playing: {}", labels.join(" · "))
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct DisplayLog {
    lines: VecDeque<LogLine>,
}

impl DisplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.lines.len() == MAX_LOG_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(LogLine {
            at: Local::now(),
            entry,
        });
    }

    pub fn notice(&mut self, severity: Severity, text: impl Into<String>) {
        self.push(LogEntry::Notice {
            severity,
            text: text.into(),
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.notice(Severity::Info, text);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.notice(Severity::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.notice(Severity::Error, text);
    }

    pub fn lines(&self) -> &VecDeque<LogLine> {
        &self.lines
    }

    pub fn last(&self) -> Option<&LogLine> {
        self.lines.back()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

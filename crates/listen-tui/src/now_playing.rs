//! The three most recently revealed tracks.

use std::collections::VecDeque;

use listen_proto::catalog::TrackRecord;

use crate::display_log::{DisplayLog, LogEntry};

pub const NOW_PLAYING_CAPACITY: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingEntry {
    pub playlist: String,
    pub track: TrackRecord,
}

impl NowPlayingEntry {
    pub fn new(playlist: impl Into<String>, track: TrackRecord) -> Self {
        Self {
            playlist: playlist.into(),
            track,
        }
    }

    /// Track name, falling back to its id when the payload had no name.
    pub fn label(&self) -> String {
        if self.track.name.is_empty() {
            format!("#{}", self.track.id)
        } else {
            self.track.name.clone()
        }
    }
}

/// FIFO of at most [`NOW_PLAYING_CAPACITY`] entries, oldest first.
#[derive(Debug, Default)]
pub struct NowPlaying {
    entries: VecDeque<NowPlayingEntry>,
}

impl NowPlaying {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(NOW_PLAYING_CAPACITY),
        }
    }

    /// Append `entry`, evicting the oldest one when full, and post the
    /// resulting buffer to `log`.  Returns the evicted entry, if any.
    pub fn append(&mut self, entry: NowPlayingEntry, log: &mut DisplayLog) -> Option<NowPlayingEntry> {
        let evicted = if self.entries.len() == NOW_PLAYING_CAPACITY {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        log.push(LogEntry::NowPlaying(self.snapshot()));
        evicted
    }

    pub fn snapshot(&self) -> Vec<NowPlayingEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &NowPlayingEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> NowPlayingEntry {
        NowPlayingEntry::new("Mix", TrackRecord::new(name, name, ""))
    }

    fn names(buf: &NowPlaying) -> Vec<String> {
        buf.entries().map(|e| e.track.name.clone()).collect()
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut buf = NowPlaying::new();
        let mut log = DisplayLog::new();
        for i in 0..20 {
            buf.append(entry(&i.to_string()), &mut log);
            assert!(buf.len() <= NOW_PLAYING_CAPACITY);
        }
        assert_eq!(names(&buf), ["17", "18", "19"]);
    }

    #[test]
    fn evicts_oldest_first() {
        let mut buf = NowPlaying::new();
        let mut log = DisplayLog::new();
        assert!(buf.append(entry("A"), &mut log).is_none());
        assert!(buf.append(entry("B"), &mut log).is_none());
        assert!(buf.append(entry("C"), &mut log).is_none());
        let evicted = buf.append(entry("D"), &mut log).unwrap();
        assert_eq!(evicted.track.name, "A");
        assert_eq!(names(&buf), ["B", "C", "D"]);
        assert_eq!(buf.entries().last().unwrap().track.name, "D");
    }

    #[test]
    fn every_append_reaches_the_log() {
        let mut buf = NowPlaying::new();
        let mut log = DisplayLog::new();
        for name in ["A", "B", "C", "D"] {
            buf.append(entry(name), &mut log);
        }
        assert_eq!(log.len(), 4);
        match &log.last().unwrap().entry {
            LogEntry::NowPlaying(view) => assert_eq!(view, &buf.snapshot()),
            other => panic!("unexpected entry {other:?}"),
        }
        assert_eq!(log.lines()[0].text(), "now playing: A");
    }

    #[test]
    fn label_falls_back_to_id() {
        let e = NowPlayingEntry::new("Mix", TrackRecord::new("42", "", ""));
        assert_eq!(e.label(), "#42");
    }
}

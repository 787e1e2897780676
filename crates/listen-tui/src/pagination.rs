//! Playlist paging — which tracks of each playlist have been revealed so far.
//!
//! The cursor stores, per playlist, the index of the *last* track shown.  The
//! next window starts at that index again, so two consecutive reveals overlap
//! by one track.  A playlist whose stored index is already its final track is
//! exhausted and yields nothing.  `CursorMode::NextUnshown` switches to
//! one-past-the-end bookkeeping for strictly disjoint windows.

use std::collections::HashMap;

use listen_proto::catalog::{Catalog, TrackRecord};
use tracing::{debug, warn};

use crate::display_log::DisplayLog;
use crate::now_playing::{NowPlaying, NowPlayingEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    #[default]
    LastShown,
    NextUnshown,
}

impl CursorMode {
    /// Smallest window that still makes progress.  A last-shown window of one
    /// would restart on the track it just showed.
    pub fn min_window(self) -> usize {
        match self {
            CursorMode::LastShown => 2,
            CursorMode::NextUnshown => 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct PaginationCursor {
    mode: CursorMode,
    shown: HashMap<String, usize>,
}

impl PaginationCursor {
    pub fn new(mode: CursorMode) -> Self {
        Self {
            mode,
            shown: HashMap::new(),
        }
    }

    /// Stored index for `playlist` (0 when nothing was revealed yet).
    pub fn position(&self, playlist: &str) -> usize {
        self.shown.get(playlist).copied().unwrap_or(0)
    }

    /// Number of leading tracks of `playlist` the user has seen.
    pub fn revealed_count(&self, playlist: &str) -> usize {
        match (self.mode, self.shown.get(playlist)) {
            (_, None) => 0,
            (CursorMode::LastShown, Some(&last)) => last + 1,
            (CursorMode::NextUnshown, Some(&next)) => next,
        }
    }

    /// Next window of at most `window` tracks.  Never reads past the end of
    /// `tracks` and never wraps; an exhausted playlist yields an empty vec.
    /// `window` is raised to [`CursorMode::min_window`].
    pub fn reveal(&mut self, playlist: &str, tracks: &[TrackRecord], window: usize) -> Vec<TrackRecord> {
        let window = window.max(self.mode.min_window());
        let stored = self.shown.get(playlist).copied();
        let start = stored.unwrap_or(0);

        if self.mode == CursorMode::LastShown && stored.is_some() && start + 1 >= tracks.len() {
            return Vec::new();
        }

        let end = start.saturating_add(window).min(tracks.len());
        if start >= end {
            return Vec::new();
        }

        let next = match self.mode {
            CursorMode::LastShown => end - 1,
            CursorMode::NextUnshown => end,
        };
        self.shown.insert(playlist.to_string(), next);
        debug!("reveal {:?}: {}..{} (cursor -> {})", playlist, start, end, next);
        tracks[start..end].to_vec()
    }
}

/// The catalog plus its paging state: everything the playlist pane shows.
#[derive(Debug)]
pub struct PlaylistBrowser {
    catalog: Catalog,
    cursor: PaginationCursor,
    window: usize,
}

impl PlaylistBrowser {
    pub fn new(catalog: Catalog, window: usize, mode: CursorMode) -> Self {
        let min = mode.min_window();
        if window < min {
            warn!("browse window of {} is too small for {:?}, using {}", window, mode, min);
        }
        let window = window.max(min);
        Self {
            catalog,
            cursor: PaginationCursor::new(mode),
            window,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn reveal(&mut self, playlist: &str) -> Vec<TrackRecord> {
        self.cursor
            .reveal(playlist, self.catalog.tracks(playlist), self.window)
    }

    /// Reveal the next window of `playlist` and push each track through the
    /// now-playing buffer.  Returns how many tracks were revealed.
    pub fn reveal_into(&mut self, playlist: &str, now_playing: &mut NowPlaying, log: &mut DisplayLog) -> usize {
        let tracks = self.reveal(playlist);
        let n = tracks.len();
        for track in tracks {
            now_playing.append(NowPlayingEntry::new(playlist, track), log);
        }
        n
    }

    /// One window per playlist, in catalog order.
    pub fn populate_all(&mut self, now_playing: &mut NowPlaying, log: &mut DisplayLog) -> usize {
        let names: Vec<String> = self.catalog.names().map(str::to_string).collect();
        names
            .iter()
            .map(|name| self.reveal_into(name, now_playing, log))
            .sum()
    }

    /// Tracks of `playlist` revealed so far, in browsing order.
    pub fn revealed(&self, playlist: &str) -> &[TrackRecord] {
        let tracks = self.catalog.tracks(playlist);
        &tracks[..self.cursor.revealed_count(playlist).min(tracks.len())]
    }

    pub fn is_exhausted(&self, playlist: &str) -> bool {
        let total = self.catalog.tracks(playlist).len();
        self.cursor.revealed_count(playlist) >= total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROCK: &str = r#"{"Rock": "[{\"TrackID\":1,\"TrackName\":\"A\",\"TrackPhoto\":\"\"},{\"TrackID\":2,\"TrackName\":\"B\",\"TrackPhoto\":\"\"},{\"TrackID\":3,\"TrackName\":\"C\",\"TrackPhoto\":\"\"},{\"TrackID\":4,\"TrackName\":\"D\",\"TrackPhoto\":\"\"}]"}"#;

    fn tracks(n: usize) -> Vec<TrackRecord> {
        (0..n)
            .map(|i| TrackRecord::new(i.to_string(), format!("t{i}"), ""))
            .collect()
    }

    fn names(tracks: &[TrackRecord]) -> Vec<&str> {
        tracks.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn first_window_of_rock() {
        let mut browser = PlaylistBrowser::new(Catalog::parse(ROCK), 3, CursorMode::LastShown);
        let mut now_playing = NowPlaying::new();
        let mut log = DisplayLog::new();

        assert_eq!(browser.reveal_into("Rock", &mut now_playing, &mut log), 3);
        let shown: Vec<String> = now_playing.entries().map(|e| e.track.name.clone()).collect();
        assert_eq!(shown, ["A", "B", "C"]);
        assert_eq!(names(browser.revealed("Rock")), ["A", "B", "C"]);
        assert!(!browser.is_exhausted("Rock"));
    }

    #[test]
    fn consecutive_windows_overlap_by_one() {
        let all = tracks(4);
        let mut cursor = PaginationCursor::default();
        assert_eq!(names(&cursor.reveal("p", &all, 3)), ["t0", "t1", "t2"]);
        assert_eq!(cursor.position("p"), 2);
        assert_eq!(names(&cursor.reveal("p", &all, 3)), ["t2", "t3"]);
        assert_eq!(cursor.position("p"), 3);
        assert!(cursor.reveal("p", &all, 3).is_empty());
        assert_eq!(cursor.position("p"), 3);
    }

    #[test]
    fn repeated_reveals_exhaust_for_every_length() {
        for n in 0..12 {
            let all = tracks(n);
            let mut cursor = PaginationCursor::default();
            let mut sizes = Vec::new();
            let mut last_position = 0;
            for _ in 0..(n + 3) {
                let window = cursor.reveal("p", &all, 3);
                assert!(cursor.position("p") < n.max(1));
                assert!(cursor.position("p") >= last_position, "cursor went backwards");
                last_position = cursor.position("p");
                sizes.push(window.len());
            }
            assert_eq!(sizes.last(), Some(&0), "n={n} never exhausted: {sizes:?}");
            let first_short = sizes.iter().position(|&s| s < 3).unwrap();
            assert!(sizes[first_short..].windows(2).all(|w| w[1] <= w[0] || w[1] == 0));
            assert!(sizes[first_short + 1..].iter().all(|&s| s == 0), "n={n}: {sizes:?}");
        }
    }

    #[test]
    fn tiny_windows_still_exhaust() {
        for mode in [CursorMode::LastShown, CursorMode::NextUnshown] {
            for window in [0, 1, 2] {
                let all = tracks(5);
                let mut cursor = PaginationCursor::new(mode);
                let windows: Vec<Vec<TrackRecord>> =
                    (0..8).map(|_| cursor.reveal("p", &all, window)).collect();
                assert!(!windows[0].is_empty(), "{mode:?}/{window}: fresh playlist was empty");
                assert_eq!(windows[0][0].name, "t0");
                assert!(windows.iter().all(|w| w.len() <= window.max(mode.min_window())));
                assert!(windows.last().unwrap().is_empty(), "{mode:?}/{window}: {windows:?}");
                assert_eq!(cursor.revealed_count("p"), 5);
            }
        }
    }

    #[test]
    fn last_shown_window_of_one_is_raised() {
        let all = tracks(3);
        let mut cursor = PaginationCursor::default();
        assert_eq!(names(&cursor.reveal("p", &all, 1)), ["t0", "t1"]);
        assert_eq!(names(&cursor.reveal("p", &all, 1)), ["t1", "t2"]);
        assert!(cursor.reveal("p", &all, 1).is_empty());
    }

    #[test]
    fn browser_clamps_configured_window() {
        let mut browser = PlaylistBrowser::new(Catalog::parse(ROCK), 0, CursorMode::LastShown);
        assert_eq!(names(&browser.reveal("Rock")), ["A", "B"]);
        let mut browser = PlaylistBrowser::new(Catalog::parse(ROCK), 0, CursorMode::NextUnshown);
        assert_eq!(names(&browser.reveal("Rock")), ["A"]);
    }

    #[test]
    fn strict_windows_do_not_overlap() {
        let all = tracks(5);
        let mut cursor = PaginationCursor::new(CursorMode::NextUnshown);
        assert_eq!(names(&cursor.reveal("p", &all, 3)), ["t0", "t1", "t2"]);
        assert_eq!(names(&cursor.reveal("p", &all, 3)), ["t3", "t4"]);
        assert!(cursor.reveal("p", &all, 3).is_empty());
        assert_eq!(cursor.revealed_count("p"), 5);
    }

    #[test]
    fn playlists_page_independently() {
        let all = tracks(6);
        let mut cursor = PaginationCursor::default();
        cursor.reveal("a", &all, 3);
        assert_eq!(cursor.position("b"), 0);
        assert_eq!(names(&cursor.reveal("b", &all, 2)), ["t0", "t1"]);
        assert_eq!(cursor.position("a"), 2);
    }

    #[test]
    fn populate_all_fills_buffer_with_last_playlist() {
        let raw = r#"{
            "Rock": "[{\"TrackID\":1,\"TrackName\":\"A\"},{\"TrackID\":2,\"TrackName\":\"B\"}]",
            "Jazz": "[{\"TrackID\":3,\"TrackName\":\"C\"},{\"TrackID\":4,\"TrackName\":\"D\"},{\"TrackID\":5,\"TrackName\":\"E\"},{\"TrackID\":6,\"TrackName\":\"F\"}]",
            "Empty": "[]"
        }"#;
        let mut browser = PlaylistBrowser::new(Catalog::parse(raw), 3, CursorMode::LastShown);
        let mut now_playing = NowPlaying::new();
        let mut log = DisplayLog::new();

        assert_eq!(browser.populate_all(&mut now_playing, &mut log), 5);
        let shown: Vec<String> = now_playing.entries().map(|e| e.track.name.clone()).collect();
        assert_eq!(shown, ["C", "D", "E"]);
        assert_eq!(log.len(), 5);
        assert!(browser.is_exhausted("Rock"));
        assert!(browser.is_exhausted("Empty"));
        assert!(browser.revealed("Empty").is_empty());
    }

    #[test]
    fn unknown_playlist_reveals_nothing() {
        let mut browser = PlaylistBrowser::new(Catalog::parse(ROCK), 3, CursorMode::LastShown);
        assert!(browser.reveal("Pop").is_empty());
        assert!(browser.is_exhausted("Pop"));
    }
}

//! Action enum — all user-initiated intents.

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Playlists,
    NowPlaying,
    Transport,
    LogPanel,
}

impl ComponentId {
    /// Focus order for Tab.
    pub const CYCLE: [ComponentId; 2] = [ComponentId::Playlists, ComponentId::LogPanel];

    pub fn next(self) -> Self {
        let idx = Self::CYCLE.iter().position(|&c| c == self).unwrap_or(0);
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()]
    }
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Transport ────────────────────────────────────────────────────────────
    Back,
    TogglePlay,
    Skip,

    // ── Browsing ─────────────────────────────────────────────────────────────
    SelectUp(usize),
    SelectDown(usize),
    /// Reveal the next window of the named playlist.
    RevealMore(String),

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    ScrollUp(usize),
    ScrollDown(usize),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles() {
        assert_eq!(ComponentId::Playlists.next(), ComponentId::LogPanel);
        assert_eq!(ComponentId::LogPanel.next(), ComponentId::Playlists);
        assert_eq!(ComponentId::NowPlaying.next(), ComponentId::LogPanel);
    }
}

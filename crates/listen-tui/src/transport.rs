//! Transport control: back, play/pause, skip.
//!
//! Every command is fire-and-forget: it goes out through a [`CommandSink`]
//! and nothing waits for the server to acknowledge it.  The play/pause
//! toggle flips on key press alone; server status never feeds back into it.

use listen_proto::protocol::Command;
use tracing::{info, warn};

use crate::session::SendError;

/// Anything that can put a command on the wire.
pub trait CommandSink {
    fn send_command(&self, command: Command) -> Result<(), SendError>;
}

/// Label shown before the first toggle.
pub const INITIAL_LABEL: &str = "play";
/// Shown while paused after a toggle.
pub const RESUME_GLYPH: &str = "▶";
/// Shown while playing.
pub const PAUSE_GLYPH: &str = "❚❚";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    Playing,
    #[default]
    Paused,
}

#[derive(Debug)]
pub struct TransportControl {
    state: PlayState,
    label: &'static str,
}

impl Default for TransportControl {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportControl {
    pub fn new() -> Self {
        Self {
            state: PlayState::Paused,
            label: INITIAL_LABEL,
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn go_back(&self, sink: &dyn CommandSink) {
        fire(sink, Command::Back);
    }

    pub fn skip(&self, sink: &dyn CommandSink) {
        fire(sink, Command::Skip);
    }

    /// Playing → `pause`; Paused → `play`.  Returns the command sent.
    pub fn toggle(&mut self, sink: &dyn CommandSink) -> Command {
        let command = match self.state {
            PlayState::Playing => {
                self.state = PlayState::Paused;
                self.label = RESUME_GLYPH;
                Command::Pause
            }
            PlayState::Paused => {
                self.state = PlayState::Playing;
                self.label = PAUSE_GLYPH;
                Command::Play
            }
        };
        fire(sink, command);
        command
    }
}

fn fire(sink: &dyn CommandSink, command: Command) {
    match sink.send_command(command) {
        Ok(()) => info!("transport: sent {}", command),
        Err(e) => warn!("transport: {} dropped: {}", command, e),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::session::SessionState;
    use std::cell::RefCell;

    /// Records every command; optionally refuses them like a closed session.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub sent: RefCell<Vec<Command>>,
        pub closed: bool,
    }

    impl CommandSink for RecordingSink {
        fn send_command(&self, command: Command) -> Result<(), SendError> {
            if self.closed {
                return Err(SendError::NotOpen(SessionState::Closed));
            }
            self.sent.borrow_mut().push(command);
            Ok(())
        }
    }

    #[test]
    fn back_and_skip_send_literals_only() {
        let sink = RecordingSink::default();
        let transport = TransportControl::new();
        transport.go_back(&sink);
        transport.skip(&sink);
        assert_eq!(*sink.sent.borrow(), [Command::Back, Command::Skip]);
        assert_eq!(transport.state(), PlayState::Paused);
        assert_eq!(transport.label(), INITIAL_LABEL);
    }

    #[test]
    fn double_toggle_from_initial_state() {
        let sink = RecordingSink::default();
        let mut transport = TransportControl::new();
        assert_eq!(transport.toggle(&sink), Command::Play);
        assert_eq!(transport.state(), PlayState::Playing);
        assert_eq!(transport.label(), PAUSE_GLYPH);
        assert_eq!(transport.toggle(&sink), Command::Pause);
        assert_eq!(transport.state(), PlayState::Paused);
        assert_eq!(transport.label(), RESUME_GLYPH);
        assert_eq!(*sink.sent.borrow(), [Command::Play, Command::Pause]);
    }

    #[test]
    fn double_toggle_from_playing() {
        let sink = RecordingSink::default();
        let mut transport = TransportControl::new();
        transport.toggle(&sink);
        sink.sent.borrow_mut().clear();

        transport.toggle(&sink);
        transport.toggle(&sink);
        assert_eq!(transport.state(), PlayState::Playing);
        assert_eq!(*sink.sent.borrow(), [Command::Pause, Command::Play]);
    }

    #[test]
    fn toggle_flips_even_when_send_is_dropped() {
        let sink = RecordingSink {
            closed: true,
            ..Default::default()
        };
        let mut transport = TransportControl::new();
        transport.toggle(&sink);
        transport.skip(&sink);
        assert_eq!(transport.state(), PlayState::Playing);
        assert!(sink.sent.borrow().is_empty());
    }
}

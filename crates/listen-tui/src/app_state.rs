//! AppState — data shared read-only with all components during render/event.
//!
//! The App event-loop is the only thing that writes to AppState.

use listen_proto::protocol::StatusFrame;

use crate::display_log::DisplayLog;
use crate::now_playing::NowPlaying;
use crate::pagination::PlaylistBrowser;
use crate::progress::ProgressReading;
use crate::session::SessionState;
use crate::transport::TransportControl;

pub struct AppState {
    pub connection: SessionState,
    pub browser: PlaylistBrowser,
    pub now_playing: NowPlaying,
    pub log: DisplayLog,
    pub transport: TransportControl,
    /// Set by the poller only; lags the status cell by up to one cycle.
    pub status: Option<StatusFrame>,
    pub progress: Option<ProgressReading>,
    /// Whether the catalog has been pushed through the now-playing buffer yet.
    pub populated: bool,
}

impl AppState {
    pub fn new(browser: PlaylistBrowser) -> Self {
        Self {
            connection: SessionState::Connecting,
            browser,
            now_playing: NowPlaying::new(),
            log: DisplayLog::new(),
            transport: TransportControl::new(),
            status: None,
            progress: None,
            populated: false,
        }
    }

    pub fn apply_status(&mut self, status: Option<StatusFrame>) {
        self.progress = status.as_ref().and_then(ProgressReading::from_status);
        self.status = status;
    }

    /// Track named by the last forwarded status frame.
    pub fn current_track(&self) -> Option<&str> {
        self.status.as_ref()?.track_name.as_deref()
    }
}

//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks:
//!   terminal input, session lifecycle events and poll cycles.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Commands to the server leave through the `SessionHandle`.

use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        log_panel::LogPanel, now_playing_pane::NowPlayingPane, playlist_pane::PlaylistPane,
        transport_bar::TransportBar,
    },
    poller::{self, PollUpdate},
    session::{SessionEvent, SessionHandle, SessionState},
    theme::C_BG,
    widgets::status_bar,
};

/// Lines scrolled per PgUp/PgDn.
const PAGE: usize = 10;
/// How often the input thread checks whether the app is gone.
const INPUT_POLL: Duration = Duration::from_millis(250);

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    Session(SessionEvent),
    Poll(PollUpdate),
}

impl From<SessionEvent> for AppMessage {
    fn from(event: SessionEvent) -> Self {
        AppMessage::Session(event)
    }
}

impl From<PollUpdate> for AppMessage {
    fn from(update: PollUpdate) -> Self {
        AppMessage::Poll(update)
    }
}

pub struct App {
    state: AppState,
    session: SessionHandle,
    /// Loopback sender handed to the poller and the input thread.
    tx: mpsc::Sender<AppMessage>,
    poll_interval: Duration,
    poller: Option<CancellationToken>,
    focus: ComponentId,
    should_quit: bool,

    playlists: PlaylistPane,
    now_playing: NowPlayingPane,
    transport_bar: TransportBar,
    log_panel: LogPanel,
}

impl App {
    pub fn new(
        state: AppState,
        session: SessionHandle,
        tx: mpsc::Sender<AppMessage>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            state,
            session,
            tx,
            poll_interval,
            poller: None,
            focus: ComponentId::Playlists,
            should_quit: false,
            playlists: PlaylistPane::new(),
            now_playing: NowPlayingPane::new(),
            transport_bar: TransportBar::new(),
            log_panel: LogPanel::new(),
        }
    }

    pub async fn run(mut self, mut rx: mpsc::Receiver<AppMessage>) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            while !event_tx.is_closed() {
                match event::poll(INPUT_POLL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                match event::read() {
                    Ok(ev) => {
                        if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        let result = self.event_loop(&mut terminal, &mut rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        self.shutdown();
        rx.close();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        rx: &mut mpsc::Receiver<AppMessage>,
    ) -> anyhow::Result<()> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            if self.should_quit {
                return Ok(());
            }

            let Some(msg) = rx.recv().await else {
                return Ok(());
            };
            needs_redraw = self.handle_message(msg);

            // Drain whatever queued up while we were drawing.
            while let Ok(next) = rx.try_recv() {
                needs_redraw |= self.handle_message(next);
            }
        }
    }

    /// Apply one message to the app.  Returns whether a redraw is needed.
    pub fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    return false;
                }
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
                true
            }
            AppMessage::Event(Event::Resize(_, _)) => true,
            AppMessage::Event(_) => false,
            AppMessage::Session(event) => {
                self.on_session_event(event);
                true
            }
            AppMessage::Poll(update) => {
                self.state.apply_status(update.status);
                true
            }
        }
    }

    fn on_session_event(&mut self, event: SessionEvent) {
        info!("session event: {:?}", event);
        match event {
            SessionEvent::Opened => {
                self.state.connection = SessionState::Open;
                self.state.log.info("Connected.");
                if !self.state.populated {
                    let state = &mut self.state;
                    let n = state
                        .browser
                        .populate_all(&mut state.now_playing, &mut state.log);
                    state.populated = true;
                    debug!("populated {} tracks from {} playlists", n, state.browser.catalog().len());
                }
                self.start_poller();
            }
            SessionEvent::Closed { reason } => {
                self.state.connection = SessionState::Closed;
                self.stop_poller();
                match reason {
                    Some(reason) => self.state.log.error(format!("Connection closed. ({})", reason)),
                    None => self.state.log.error("Connection closed."),
                }
            }
            SessionEvent::DecodeFailed { error } => {
                self.state
                    .log
                    .warn(format!("Ignored a status frame that could not be read: {}", error));
            }
            SessionEvent::Unsupported { reason } => {
                self.state.connection = SessionState::Closed;
                self.state.log.error(format!("Cannot connect: {}", reason));
            }
            SessionEvent::Reconnecting { attempt, delay } => {
                self.state.connection = SessionState::Connecting;
                self.state.log.warn(format!(
                    "Reconnecting in {:.1}s (attempt {})",
                    delay.as_secs_f64(),
                    attempt
                ));
            }
        }
    }

    fn start_poller(&mut self) {
        self.stop_poller();
        let cancel = CancellationToken::new();
        poller::spawn(
            self.session.clone(),
            self.poll_interval,
            self.tx.clone(),
            cancel.clone(),
        );
        self.poller = Some(cancel);
    }

    fn stop_poller(&mut self) {
        if let Some(cancel) = self.poller.take() {
            cancel.cancel();
        }
    }

    fn shutdown(&mut self) {
        self.stop_poller();
        self.session.close();
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        // Global keys, active regardless of focus
        match key.code {
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => return vec![Action::Quit],
            KeyCode::Char('q') | KeyCode::Esc => return vec![Action::Quit],
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::Char('b') | KeyCode::Left => return vec![Action::Back],
            KeyCode::Char(' ') | KeyCode::Char('p') => return vec![Action::TogglePlay],
            KeyCode::Char('s') | KeyCode::Right => return vec![Action::Skip],
            KeyCode::PageUp => return vec![Action::ScrollUp(PAGE)],
            KeyCode::PageDown => return vec![Action::ScrollDown(PAGE)],
            _ => {}
        }

        let state = &self.state;
        match self.focus {
            ComponentId::LogPanel => self.log_panel.handle_key(key, state),
            _ => self.playlists.handle_key(key, state),
        }
    }

    fn dispatch(&mut self, action: Action) {
        // Broadcast action to all components first (selection and scroll live there)
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.playlists.on_action(&action, s));
            out.extend(self.log_panel.on_action(&action, s));
            out
        };

        self.apply_action(action);

        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            // ── Transport ─────────────────────────────────────────────────────
            Action::Back => self.state.transport.go_back(&self.session),
            Action::TogglePlay => {
                self.state.transport.toggle(&self.session);
            }
            Action::Skip => self.state.transport.skip(&self.session),

            // ── Browsing ──────────────────────────────────────────────────────
            Action::RevealMore(name) => {
                let state = &mut self.state;
                let n = state
                    .browser
                    .reveal_into(&name, &mut state.now_playing, &mut state.log);
                if n == 0 {
                    state.log.info(format!("{}: no more tracks", name));
                }
            }
            Action::SelectUp(_) | Action::SelectDown(_) => {}

            // ── Navigation ────────────────────────────────────────────────────
            Action::FocusNext => {
                self.focus = self.focus.next();
                debug!("focus -> {:?}", self.focus);
            }
            Action::ScrollUp(_) | Action::ScrollDown(_) => {}

            // ── System ────────────────────────────────────────────────────────
            Action::Quit => {
                if self.should_quit {
                    return;
                }
                info!("quit requested");
                self.should_quit = true;
                self.shutdown();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        // ── Outer layout: body | transport | log | statusbar ─────────────────
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(10),
                Constraint::Length(1),
            ])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer[0]);

        let focus = self.focus;
        let state = &self.state;
        self.playlists
            .draw(frame, body[0], focus == ComponentId::Playlists, state);
        self.now_playing
            .draw(frame, body[1], focus == ComponentId::NowPlaying, state);
        status_bar::draw_separator(frame, outer[1]);
        self.transport_bar.draw(frame, outer[2], false, state);
        self.log_panel
            .draw(frame, outer[3], focus == ComponentId::LogPanel, state);
        status_bar::draw_keys_bar(frame, outer[4], state.connection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{CursorMode, PlaylistBrowser};
    use crate::session::{self, ReconnectPolicy};
    use crate::transport::{PlayState, PAUSE_GLYPH};
    use listen_proto::catalog::Catalog;
    use listen_proto::protocol::StatusFrame;
    use ratatui::backend::TestBackend;

    const ROCK: &str = r#"{"Rock":[{"TrackID":1,"TrackName":"A"},{"TrackID":2,"TrackName":"B"},{"TrackID":3,"TrackName":"C"},{"TrackID":4,"TrackName":"D"}]}"#;

    /// App wired to a session that never connects, so commands are dropped.
    fn app() -> (App, mpsc::Receiver<AppMessage>) {
        let (tx, rx) = mpsc::channel(64);
        let session = session::open("http://127.0.0.1:1/ws", ReconnectPolicy::disabled(), tx.clone());
        let browser = PlaylistBrowser::new(Catalog::parse(ROCK), 3, CursorMode::LastShown);
        let app = App::new(AppState::new(browser), session, tx, Duration::from_secs(60));
        (app, rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        app.handle_message(AppMessage::Event(Event::Key(key)));
    }

    fn shown(app: &App) -> Vec<String> {
        app.state.now_playing.entries().map(|e| e.track.name.clone()).collect()
    }

    #[tokio::test]
    async fn opening_populates_once() {
        let (mut app, _rx) = app();
        app.handle_message(AppMessage::Session(SessionEvent::Opened));
        assert_eq!(app.state.connection, SessionState::Open);
        assert_eq!(shown(&app), ["A", "B", "C"]);
        assert!(app.poller.is_some());

        app.handle_message(AppMessage::Session(SessionEvent::Opened));
        assert_eq!(shown(&app), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn close_logs_and_stops_polling() {
        let (mut app, _rx) = app();
        app.handle_message(AppMessage::Session(SessionEvent::Opened));
        let token = app.poller.clone().unwrap();

        app.handle_message(AppMessage::Session(SessionEvent::Closed { reason: None }));
        assert_eq!(app.state.connection, SessionState::Closed);
        assert!(token.is_cancelled());
        assert!(app.poller.is_none());
        assert_eq!(app.state.log.last().unwrap().text(), "Connection closed.");
    }

    #[tokio::test]
    async fn reveal_key_pages_the_selected_playlist() {
        let (mut app, _rx) = app();
        app.handle_message(AppMessage::Session(SessionEvent::Opened));
        // Windows overlap on the last shown track: A,B,C then C,D.
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(shown(&app), ["C", "C", "D"]);

        press(&mut app, KeyCode::Enter);
        assert_eq!(shown(&app), ["C", "C", "D"]);
        assert_eq!(app.state.log.last().unwrap().text(), "Rock: no more tracks");
    }

    #[tokio::test]
    async fn toggle_flips_without_a_connection() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.state.transport.state(), PlayState::Playing);
        assert_eq!(app.state.transport.label(), PAUSE_GLYPH);
    }

    #[tokio::test]
    async fn poll_update_drives_progress() {
        let (mut app, _rx) = app();
        let status = StatusFrame::decode(r#"{"Progress":"45","Duration":"180","TrackName":"Song"}"#).unwrap();
        app.handle_message(AppMessage::Poll(PollUpdate {
            cycle: 0,
            status: Some(status),
        }));
        assert_eq!(app.state.progress.unwrap().value(), 25.0);
        assert_eq!(app.state.current_track(), Some("Song"));
    }

    #[tokio::test]
    async fn quit_closes_the_session() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
        assert!(app.session.is_shut_down());
    }

    #[tokio::test]
    async fn tab_moves_scroll_keys_to_the_log() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, ComponentId::LogPanel);
        press(&mut app, KeyCode::Char('k'));
        assert!(!app.log_panel.is_following());
    }

    #[tokio::test]
    async fn draws_every_pane() {
        let (mut app, _rx) = app();
        app.handle_message(AppMessage::Session(SessionEvent::Opened));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        for needle in ["playlists", "now playing", "log", "LIVE", "[play]"] {
            assert!(text.contains(needle), "missing {needle:?}");
        }
    }
}

//! Connection session — the WebSocket to the playback server.
//!
//! `open()` spawns one task that owns the socket for its whole life.  The
//! rest of the client talks to it through a cloneable [`SessionHandle`]:
//!
//! - outbound commands go through an unbounded mpsc and leave as text frames;
//! - the connection state and the latest decoded status frame are published
//!   on `watch` channels (single writer: the session task);
//! - lifecycle events (`Opened`, `Closed`, `DecodeFailed`, …) are pushed to
//!   the caller's event channel.
//!
//! A closed session stays closed unless a [`ReconnectPolicy`] is enabled.

use std::fmt;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use listen_proto::config::ReconnectConfig;
use listen_proto::protocol::{Command, StatusFrame};
use rand::Rng;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::poller::StatusSource;
use crate::transport::CommandSink;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Upper bound of the random delay added to each reconnect backoff.
const RECONNECT_JITTER_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Connecting => "connecting",
            SessionState::Open => "open",
            SessionState::Closed => "closed",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Handshake completed; commands can be sent.
    Opened,
    /// The connection ended (or never came up).  `reason` is `None` for a
    /// clean close without a close frame reason.
    Closed { reason: Option<String> },
    /// An inbound frame was not a status object.  The previous status stays.
    DecodeFailed { error: String },
    /// The URL cannot be served by this client; nothing was attempted.
    Unsupported { reason: String },
    Reconnecting { attempt: u32, delay: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("session is {0}, command dropped")]
    NotOpen(SessionState),
    #[error("session task has exited")]
    Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn disabled() -> Self {
        Self::from_config(&ReconnectConfig::default())
    }

    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self {
            enabled: config.enabled,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_attempts: config.max_attempts,
        }
    }

    /// `base * 2^(attempt-1)`, capped at `max_delay`.  `attempt` starts at 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }

    fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(0..RECONNECT_JITTER_MS);
        self.backoff(attempt) + Duration::from_millis(jitter)
    }

    fn allows(&self, attempt: u32) -> bool {
        self.enabled && attempt <= self.max_attempts
    }
}

#[derive(Debug, Clone)]
pub struct SessionHandle {
    outbound: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SessionState>,
    status: watch::Receiver<Option<StatusFrame>>,
    shutdown: CancellationToken,
}

impl SessionHandle {
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Queue `command` for the socket.  Refused unless the session is open.
    pub fn send(&self, command: Command) -> Result<(), SendError> {
        let state = self.state();
        if state != SessionState::Open {
            debug!("session: dropping {} while {}", command, state);
            return Err(SendError::NotOpen(state));
        }
        self.outbound.send(command).map_err(|_| SendError::Gone)
    }

    /// The most recent status frame received, if any.
    pub fn latest_status(&self) -> Option<StatusFrame> {
        self.status.borrow().clone()
    }

    /// Receiver that wakes on every decoded status frame.
    pub fn on_status(&self) -> watch::Receiver<Option<StatusFrame>> {
        self.status.clone()
    }

    /// Resolves once the session has been observed closed, or its task has
    /// exited.
    pub async fn closed(&self) {
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| *s == SessionState::Closed).await;
    }

    /// Close the socket and stop any reconnect loop.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl CommandSink for SessionHandle {
    fn send_command(&self, command: Command) -> Result<(), SendError> {
        self.send(command)
    }
}

impl StatusSource for SessionHandle {
    fn latest_status(&self) -> Option<StatusFrame> {
        SessionHandle::latest_status(self)
    }
}

/// Start a session to `url`.  Must be called inside a tokio runtime.
///
/// Only `ws://` URLs are served; anything else is reported as
/// [`SessionEvent::Unsupported`] and the session is closed immediately.
pub fn open<T>(url: &str, reconnect: ReconnectPolicy, events: mpsc::Sender<T>) -> SessionHandle
where
    T: From<SessionEvent> + Send + 'static,
{
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(SessionState::Connecting);
    let (status_tx, status_rx) = watch::channel(None);
    let shutdown = CancellationToken::new();

    let handle = SessionHandle {
        outbound: outbound_tx,
        state: state_rx,
        status: status_rx,
        shutdown: shutdown.clone(),
    };

    let driver = Driver {
        url: url.to_string(),
        reconnect,
        outbound: outbound_rx,
        state: state_tx,
        status: status_tx,
        events,
        shutdown,
    };
    tokio::spawn(driver.run());

    handle
}

struct Driver<T> {
    url: String,
    reconnect: ReconnectPolicy,
    outbound: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<SessionState>,
    status: watch::Sender<Option<StatusFrame>>,
    events: mpsc::Sender<T>,
    shutdown: CancellationToken,
}

impl<T> Driver<T>
where
    T: From<SessionEvent> + Send + 'static,
{
    async fn run(mut self) {
        if let Err(reason) = check_scheme(&self.url) {
            warn!("session: {}", reason);
            self.state.send_replace(SessionState::Closed);
            self.emit(SessionEvent::Unsupported { reason }).await;
            return;
        }

        let mut attempt = 0u32;
        loop {
            self.state.send_replace(SessionState::Connecting);
            info!("session: connecting to {}", self.url);

            let connected = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => None,
                result = connect_async(self.url.as_str()) => Some(result),
            };

            let reason = match connected {
                None => Some("closed by client".to_string()),
                Some(Ok((ws, _response))) => {
                    attempt = 0;
                    self.discard_stale_commands();
                    self.state.send_replace(SessionState::Open);
                    info!("session: open");
                    self.emit(SessionEvent::Opened).await;
                    self.pump(ws).await
                }
                Some(Err(e)) => {
                    warn!("session: handshake with {} failed: {}", self.url, e);
                    Some(e.to_string())
                }
            };

            self.state.send_replace(SessionState::Closed);
            info!("session: closed ({})", reason.as_deref().unwrap_or("no reason"));
            self.emit(SessionEvent::Closed { reason }).await;

            attempt += 1;
            if self.shutdown.is_cancelled() || !self.reconnect.allows(attempt) {
                break;
            }
            let delay = self.reconnect.delay_with_jitter(attempt);
            info!("session: reconnect attempt {} in {:?}", attempt, delay);
            self.emit(SessionEvent::Reconnecting { attempt, delay }).await;
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        debug!("session: task finished");
    }

    /// Shuttle frames until the connection ends.  Returns the close reason.
    async fn pump(&mut self, ws: WsStream) -> Option<String> {
        let (mut sink, mut stream) = ws.split();
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = sink.close().await;
                    return Some("closed by client".to_string());
                }
                command = self.outbound.recv() => {
                    let Some(command) = command else {
                        let _ = sink.close().await;
                        return None;
                    };
                    trace!("session: -> {}", command);
                    if let Err(e) = sink.send(Message::Text(command.as_str().to_string())).await {
                        warn!("session: send {} failed: {}", command, e);
                        return Some(e.to_string());
                    }
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_frame(&text).await,
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => self.handle_frame(&text).await,
                        Err(e) => self.decode_failed(e.to_string()).await,
                    },
                    Some(Ok(Message::Close(frame))) => {
                        return frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty());
                    }
                    // Ping/pong are answered by tungstenite itself.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("session: read error: {}", e);
                        return Some(e.to_string());
                    }
                    None => return None,
                },
            }
        }
    }

    async fn handle_frame(&self, text: &str) {
        debug!("session: <- {}", text);
        match StatusFrame::decode(text) {
            Ok(frame) => {
                self.status.send_replace(Some(frame));
            }
            Err(e) => self.decode_failed(e.to_string()).await,
        }
    }

    async fn decode_failed(&self, error: String) {
        warn!("session: ignoring inbound frame: {}", error);
        self.emit(SessionEvent::DecodeFailed { error }).await;
    }

    /// Commands queued for a previous connection are not replayed.
    fn discard_stale_commands(&mut self) {
        while let Ok(command) = self.outbound.try_recv() {
            debug!("session: discarding stale {}", command);
        }
    }

    async fn emit(&self, event: SessionEvent) {
        // A dropped receiver only means nobody is listening any more.
        let _ = self.events.send(T::from(event)).await;
    }
}

fn check_scheme(url: &str) -> Result<(), String> {
    match url.split_once("://") {
        Some(("ws", rest)) if !rest.is_empty() => Ok(()),
        Some((scheme, _)) => Err(format!(
            "{}:// connections are not supported by this client ({})",
            scheme, url
        )),
        None => Err(format!("{} is not a WebSocket URL", url)),
    }
}

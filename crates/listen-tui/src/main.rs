mod action;
mod app;
mod app_state;
mod component;
mod components;
mod display_log;
mod now_playing;
mod pagination;
mod poller;
mod progress;
mod session;
mod theme;
mod transport;
mod widgets;

use listen_proto::catalog::Catalog;
use listen_proto::config::Config;
use tokio::sync::mpsc;

use crate::app::{App, AppMessage};
use crate::app_state::AppState;
use crate::pagination::{CursorMode, PlaylistBrowser};
use crate::session::ReconnectPolicy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = listen_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("listen.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but keep the
    // websocket internals quiet.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,tungstenite=warn,tokio_tungstenite=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("listen log: {}", log_path.display());

    tracing::info!("listen starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config: {}; using defaults", e);
        Config::default()
    });

    // ── Catalog ──────────────────────────────────────────────────────────────
    let payload_path = &config.playlists.payload_file;
    let (catalog, load_error) = match Catalog::load(payload_path) {
        Ok(catalog) => (catalog, None),
        Err(e) => {
            tracing::warn!("playlists: {}: {}", payload_path.display(), e);
            (Catalog::default(), Some(e))
        }
    };
    let mode = if config.browse.strict_windows {
        CursorMode::NextUnshown
    } else {
        CursorMode::LastShown
    };
    let browser = PlaylistBrowser::new(catalog, config.browse.window_size, mode);

    let mut state = AppState::new(browser);
    if let Some(e) = load_error {
        state.log.warn(format!(
            "No playlists loaded from {}: {}",
            payload_path.display(),
            e
        ));
    }
    let notices: Vec<String> = state
        .browser
        .catalog()
        .errors()
        .iter()
        .map(|e| e.to_string())
        .collect();
    for notice in notices {
        state.log.warn(notice);
    }

    // ── Session ──────────────────────────────────────────────────────────────
    let (tx, rx) = mpsc::channel::<AppMessage>(1024);
    let url = config.ws_url();
    tracing::info!("connecting to {}", url);
    state.log.info(format!("Connecting to {}…", url));
    let session = session::open(
        &url,
        ReconnectPolicy::from_config(&config.session.reconnect),
        tx.clone(),
    );

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = App::new(state, session, tx, config.poll.interval());
    app.run(rx).await?;

    tracing::info!("listen exiting");
    Ok(())
}

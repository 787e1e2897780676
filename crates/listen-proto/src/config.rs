use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::platform;
use super::protocol::WS_PATH;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub playlists: PlaylistsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// `host[:port]` of the playback server.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_ws_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between two `playback` requests.
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Tracks revealed per pagination step.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Use non-overlapping windows instead of repeating the last shown track.
    #[serde(default)]
    pub strict_windows: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Reconnect-on-close.  Off by default: a closed session stays closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistsConfig {
    /// JSON payload mapping playlist names to encoded track arrays.
    /// Defaults to `$XDG_CONFIG_HOME/listen/playlists.json`.
    #[serde(default = "default_payload_file")]
    pub payload_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            path: default_ws_path(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Shortest accepted delay between two `playback` requests.
pub const MIN_POLL_INTERVAL_MS: u64 = 250;

impl PollConfig {
    /// `interval_ms`, raised to [`MIN_POLL_INTERVAL_MS`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            strict_windows: false,
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for PlaylistsConfig {
    fn default() -> Self {
        Self {
            payload_file: default_payload_file(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_ws_path() -> String {
    WS_PATH.to_string()
}

fn default_poll_interval_ms() -> u64 {
    8500
}

fn default_window_size() -> usize {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    8
}

fn default_payload_file() -> PathBuf {
    platform::config_dir().join("playlists.json")
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// WebSocket URL of the playback server, e.g. `ws://127.0.0.1:8080/ws`.
    ///
    /// A host that already carries a scheme is used as-is so that other
    /// schemes reach the session and get reported there.
    pub fn ws_url(&self) -> String {
        let host = self.server.host.trim_end_matches('/');
        let path = if self.server.path.starts_with('/') {
            self.server.path.clone()
        } else {
            format!("/{}", self.server.path)
        };
        if host.contains("://") {
            format!("{}{}", host, path)
        } else {
            format!("ws://{}{}", host, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ws_url(), "ws://127.0.0.1:8080/ws");
        assert_eq!(config.poll.interval(), Duration::from_millis(8500));
        assert_eq!(config.browse.window_size, 3);
        assert!(!config.browse.strict_windows);
        assert!(!config.session.reconnect.enabled);
        assert!(config
            .playlists
            .payload_file
            .ends_with("listen/playlists.json"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "music.local:9000"
            path = "socket"

            [session.reconnect]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.ws_url(), "ws://music.local:9000/socket");
        assert_eq!(config.poll.interval_ms, 8500);
        assert!(config.session.reconnect.enabled);
        assert_eq!(config.session.reconnect.max_attempts, 8);
    }

    #[test]
    fn zero_poll_interval_is_floored() {
        let config: Config = toml::from_str("[poll]\ninterval_ms = 0\n").unwrap();
        assert_eq!(config.poll.interval(), Duration::from_millis(MIN_POLL_INTERVAL_MS));
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let mut config = Config::default();
        config.server.host = "wss://music.example/".to_string();
        assert_eq!(config.ws_url(), "wss://music.example/ws");
    }

    #[test]
    fn round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.server.host, "127.0.0.1:8080");
        assert_eq!(back.browse.window_size, 3);
    }
}

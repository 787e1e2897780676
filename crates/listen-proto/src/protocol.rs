use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Path of the WebSocket endpoint on the serving host.
pub const WS_PATH: &str = "/ws";

/// Messages sent from the client to the playback server.
///
/// Each command travels as a bare text frame holding its literal name; the
/// server never sees JSON from us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Back,
    Play,
    Pause,
    Skip,
    /// Ask the server for the current playback status.
    Playback,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Back,
        Command::Play,
        Command::Pause,
        Command::Skip,
        Command::Playback,
    ];

    /// The literal text frame for this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Back => "back",
            Command::Play => "play",
            Command::Pause => "pause",
            Command::Skip => "skip",
            Command::Playback => "playback",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownCommand(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("malformed status frame: {0}")]
    MalformedStatus(#[from] serde_json::Error),
}

/// Playback status as reported by the server in reply to `playback`.
///
/// `Progress` and `Duration` arrive either as JSON numbers or as numeric
/// strings; both are accepted.  The track fields mirror the server's queue
/// object and are optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusFrame {
    #[serde(rename = "Progress", deserialize_with = "number_or_string")]
    pub progress: f64,
    #[serde(rename = "Duration", deserialize_with = "number_or_string")]
    pub duration: f64,
    #[serde(rename = "TrackName", default, deserialize_with = "non_empty")]
    pub track_name: Option<String>,
    #[serde(rename = "TrackID", default, deserialize_with = "opt_id")]
    pub track_id: Option<String>,
    #[serde(rename = "TrackPhoto", default, deserialize_with = "non_empty")]
    pub track_photo: Option<String>,
}

impl StatusFrame {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// `progress / duration`, or `None` when the duration is not positive.
    pub fn ratio(&self) -> Option<f64> {
        if !(self.duration.is_finite() && self.duration > 0.0) || !self.progress.is_finite() {
            return None;
        }
        Some(self.progress / self.duration)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("{s:?} is not numeric: {e}"))),
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()))
}

fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| crate::catalog::id_text(&v)))
}

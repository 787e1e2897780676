//! Track catalog: the playlist payload handed to the client at start-up.
//!
//! The payload is a JSON object keyed by playlist name.  Each value is a
//! *string* holding a JSON array of track objects, so every playlist is
//! decoded twice.  Bad input never escapes this module: a broken payload
//! becomes an empty catalog, a broken playlist becomes an empty playlist, and
//! each failure is kept in [`Catalog::errors`] for the caller to surface.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Shown in place of a track's cover when the payload has none.
pub const PLACEHOLDER_PHOTO: &str = "https://dummyimage.com/100x100/000/fff";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTrack")]
pub struct TrackRecord {
    /// Opaque identifier, kept in its textual form for display.
    pub id: String,
    pub name: String,
    /// Cover URL.  May be empty or point nowhere.
    pub photo_url: String,
}

impl TrackRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, photo_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            photo_url: photo_url.into(),
        }
    }

    pub fn photo_or_placeholder(&self) -> &str {
        if self.photo_url.trim().is_empty() {
            PLACEHOLDER_PHOTO
        } else {
            &self.photo_url
        }
    }
}

#[derive(Deserialize)]
struct RawTrack {
    #[serde(rename = "TrackID", default)]
    id: Value,
    #[serde(rename = "TrackName", default)]
    name: Option<String>,
    #[serde(rename = "TrackPhoto", default)]
    photo: Option<String>,
}

impl From<RawTrack> for TrackRecord {
    fn from(raw: RawTrack) -> Self {
        Self {
            id: id_text(&raw.id).unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            photo_url: raw.photo.unwrap_or_default(),
        }
    }
}

/// Textual form of an identifier that may arrive as a string or a number.
pub(crate) fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<TrackRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("playlist payload is not valid JSON: {0}")]
    Payload(#[source] serde_json::Error),
    #[error("playlist payload must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("playlist {playlist:?} could not be decoded: {source}")]
    Playlist {
        playlist: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("playlist {playlist:?} must be an encoded track array, found {kind}")]
    PlaylistKind { playlist: String, kind: &'static str },
}

/// All playlists, in payload order.
#[derive(Debug, Default)]
pub struct Catalog {
    playlists: Vec<Playlist>,
    errors: Vec<CatalogError>,
}

impl Catalog {
    pub fn parse(raw: &str) -> Self {
        let outer = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => return Self::failed(CatalogError::NotAnObject(kind_of(&other))),
            Err(e) => return Self::failed(CatalogError::Payload(e)),
        };

        let mut playlists = Vec::with_capacity(outer.len());
        let mut errors = Vec::new();
        for (name, value) in outer {
            let tracks = match decode_playlist(&name, value) {
                Ok(tracks) => tracks,
                Err(e) => {
                    warn!("{}", e);
                    errors.push(e);
                    Vec::new()
                }
            };
            debug!("catalog: {:?} has {} tracks", name, tracks.len());
            playlists.push(Playlist { name, tracks });
        }

        Self { playlists, errors }
    }

    /// Read and parse a payload file.  Only I/O errors are returned; decode
    /// problems land in [`Catalog::errors`] as with [`Catalog::parse`].
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::parse(&raw))
    }

    fn failed(error: CatalogError) -> Self {
        warn!("{}", error);
        Self {
            playlists: Vec::new(),
            errors: vec![error],
        }
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn playlist(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    /// Tracks of `name`, empty when the playlist is unknown.
    pub fn tracks(&self, name: &str) -> &[TrackRecord] {
        self.playlist(name).map(|p| p.tracks.as_slice()).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.playlists.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn errors(&self) -> &[CatalogError] {
        &self.errors
    }
}

fn decode_playlist(name: &str, value: Value) -> Result<Vec<TrackRecord>, CatalogError> {
    let decoded = match value {
        Value::String(encoded) => serde_json::from_str(&encoded),
        // Already-decoded arrays show up when the payload was built by hand.
        Value::Array(_) => serde_json::from_value(value),
        other => {
            return Err(CatalogError::PlaylistKind {
                playlist: name.to_string(),
                kind: kind_of(&other),
            })
        }
    };
    decoded.map_err(|source| CatalogError::Playlist {
        playlist: name.to_string(),
        source,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Custom playlist domain types
use crate::types::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-curated playlist
///
/// Played exactly like an album's song list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPlaylist {
    /// Unique playlist identifier (`pl_...`)
    pub id: String,

    /// Playlist name
    pub name: String,

    /// Ordered songs
    #[serde(default)]
    pub songs: Vec<Track>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new playlist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlaylist {
    /// Requested name, trimmed by the store
    pub name: String,
    /// Initial songs
    #[serde(default)]
    pub songs: Vec<Track>,
}

impl CreatePlaylist {
    /// Create an empty playlist request
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            songs: Vec::new(),
        }
    }
}

/// Partial update of a playlist (only provided fields change)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistPatch {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Replacement song list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub songs: Option<Vec<Track>>,
}

impl PlaylistPatch {
    /// Patch that only renames
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            songs: None,
        }
    }
}

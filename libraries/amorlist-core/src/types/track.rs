//! Track and album types

use serde::{Deserialize, Serialize};

/// A playable item from the library
///
/// Identity is `id`. Tracks are owned by the library and referenced by
/// playlists, the play queue, history and favorites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track identifier
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist name
    #[serde(default)]
    pub artist: String,

    /// Album name
    #[serde(default)]
    pub album: String,

    /// Media URI handed to the sink
    pub src: String,

    /// Cover art URI
    #[serde(default)]
    pub cover: String,

    /// Whether this item must be rendered by the video sink
    #[serde(default)]
    pub is_video: bool,
}

/// An album as produced by the library provider
///
/// Read-only from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Unique album identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Cover art URI
    #[serde(default)]
    pub cover: String,

    /// Songs in album order
    #[serde(default)]
    pub songs: Vec<Track>,
}

impl Album {
    /// Create an album
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cover: impl Into<String>,
        songs: Vec<Track>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cover: cover.into(),
            songs,
        }
    }

    /// Whether every song in this album is a video
    pub fn is_video_album(&self) -> bool {
        !self.songs.is_empty() && self.songs.iter().all(|s| s.is_video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_uses_player_field_names() {
        let json = r#"{
            "id": "1AbC",
            "title": "Driver's High",
            "artist": "L'Arc~en~Ciel",
            "album": "ark",
            "src": "/api/stream/1AbC",
            "cover": "/api/image/9xY",
            "isVideo": true
        }"#;

        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.id, "1AbC");
        assert!(track.is_video);

        let back = serde_json::to_value(&track).unwrap();
        assert_eq!(back["isVideo"], serde_json::json!(true));
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{"id": "x", "title": "X", "src": "/x"}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert!(!track.is_video);
        assert!(track.artist.is_empty());
        assert!(track.cover.is_empty());
    }

    #[test]
    fn video_album_detection() {
        let video = Track {
            id: "v".to_string(),
            title: "Live".to_string(),
            artist: String::new(),
            album: String::new(),
            src: "/v".to_string(),
            cover: String::new(),
            is_video: true,
        };

        assert!(Album::new("a", "Lives", "", vec![video.clone()]).is_video_album());
        assert!(!Album::new("b", "Empty", "", vec![]).is_video_album());

        let audio = Track {
            is_video: false,
            ..video.clone()
        };
        assert!(!Album::new("c", "Mixed", "", vec![video, audio]).is_video_album());
    }
}

//! Playback Events
//!
//! Event-based communication for UI synchronization. The engine buffers
//! events as its state changes; the host drains and renders them.

use crate::types::{PlaybackStatus, RepeatMode, SinkKind};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback status changed (playing, paused, stopped)
    StateChanged { status: PlaybackStatus },

    /// A different track became current
    TrackChanged {
        /// ID of the new (current) track
        track_id: String,
        /// ID of the previous track (if any)
        previous_track_id: Option<String>,
        /// Sink now driving playback
        sink: SinkKind,
    },

    /// Play queue changed (tracks added/removed)
    QueueChanged { length: usize },

    /// Shuffle toggled
    ShuffleChanged { enabled: bool },

    /// Repeat mode cycled
    RepeatChanged { mode: RepeatMode },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        level: f32,
        muted: bool,
    },

    /// A track was liked or unliked
    FavoriteChanged { track_id: String, favorite: bool },

    /// Position update, forwarded from the active sink
    Position {
        position_ms: u64,
        duration_ms: Option<u64>,
    },

    /// The next track is close enough to start buffering
    PreloadNext { track_id: String, src: String },

    /// Sleep timer ran out and playback was paused
    SleepTimerExpired,

    /// Media failed; playback did not advance
    Error { sink: SinkKind, message: String },
}

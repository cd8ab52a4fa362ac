//! Persisted resume snapshot

use crate::types::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resume point written after every meaningful playback change
///
/// Format: `{ track, time, playlist, index }` with `time` in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Track that was current when the snapshot was taken
    pub track: Track,

    /// Elapsed time in seconds
    #[serde(default)]
    pub time: f64,

    /// Active playlist at the time of the snapshot
    #[serde(default)]
    pub playlist: Vec<Track>,

    /// Index of `track` within `playlist`
    #[serde(default)]
    pub index: usize,
}

impl PlaybackSnapshot {
    /// Elapsed time as a `Duration`
    ///
    /// Negative, NaN or absurdly large values read as zero.
    pub fn elapsed(&self) -> Duration {
        if self.time.is_finite() && self.time > 0.0 {
            Duration::try_from_secs_f64(self.time).unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        }
    }

    /// Playlist to restore, falling back to the lone track when the saved
    /// playlist is empty
    pub fn restored_playlist(&self) -> (Vec<Track>, usize) {
        if self.playlist.is_empty() {
            return (vec![self.track.clone()], 0);
        }

        // Trust the saved track over a stale index
        let index = if self
            .playlist
            .get(self.index)
            .is_some_and(|t| t.id == self.track.id)
        {
            self.index
        } else {
            self.playlist
                .iter()
                .position(|t| t.id == self.track.id)
                .unwrap_or(0)
        };

        (self.playlist.clone(), index)
    }
}

//! Core types for playback management

use amorlist_core::Track;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which media sink renders a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Audio,
    Video,
}

impl SinkKind {
    /// Sink that must play `track`
    pub fn for_track(track: &Track) -> Self {
        if track.is_video {
            Self::Video
        } else {
            Self::Audio
        }
    }

    /// The other sink
    pub fn other(self) -> Self {
        match self {
            Self::Audio => Self::Video,
            Self::Video => Self::Audio,
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Direction for manual track navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No track loaded
    Stopped,

    /// Currently playing
    Playing,

    /// Track loaded, not playing
    Paused,
}

/// Repeat mode
///
/// Only consulted when a track ends naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Advance (with wrap-around) when a track ends
    #[default]
    Off,

    /// Loop the whole playlist
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Off → All → One → Off
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for the playback engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Maximum history size (default: 50)
    pub history_size: usize,

    /// "Previous" restarts the current track past this point (default: 3s)
    pub restart_threshold_secs: f64,

    /// Resume snapshot cadence while playing (default: 10s)
    pub snapshot_interval_secs: u64,

    /// Volume used when nothing was persisted (default: 1.0)
    pub initial_volume: f32,

    /// Volume up/down step (default: 0.1)
    pub volume_step: f32,

    /// Seek forward/backward step (default: 10s)
    pub seek_step_secs: f64,

    /// Fraction of the track after which the next one is announced for
    /// preloading (default: 0.8)
    pub preload_threshold: f64,
}

impl PlaybackConfig {
    /// Restart threshold as a `Duration`
    pub fn restart_threshold(&self) -> Duration {
        secs(self.restart_threshold_secs)
    }

    /// Seek step as a `Duration`
    pub fn seek_step(&self) -> Duration {
        secs(self.seek_step_secs)
    }
}

fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
    } else {
        Duration::ZERO
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_size: 50,
            restart_threshold_secs: 3.0,
            snapshot_interval_secs: 10,
            initial_volume: 1.0,
            volume_step: 0.1,
            seek_step_secs: 10.0,
            preload_threshold: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.history_size, 50);
        assert_eq!(config.restart_threshold(), Duration::from_secs(3));
        assert_eq!(config.snapshot_interval_secs, 10);
        assert_eq!(config.initial_volume, 1.0);
        assert_eq!(config.seek_step(), Duration::from_secs(10));
    }

    #[test]
    fn repeat_cycles_through_three_modes() {
        let mode = RepeatMode::Off;
        assert_eq!(mode.cycle(), RepeatMode::All);
        assert_eq!(mode.cycle().cycle(), RepeatMode::One);
        assert_eq!(mode.cycle().cycle().cycle(), RepeatMode::Off);
    }

    #[test]
    fn sink_kind_follows_track() {
        let mut track = Track {
            id: "1".to_string(),
            title: "One".to_string(),
            artist: String::new(),
            album: String::new(),
            src: "/1".to_string(),
            cover: String::new(),
            is_video: false,
        };
        assert_eq!(SinkKind::for_track(&track), SinkKind::Audio);

        track.is_video = true;
        assert_eq!(SinkKind::for_track(&track), SinkKind::Video);
        assert_eq!(SinkKind::Video.other(), SinkKind::Audio);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: PlaybackConfig = serde_json::from_str(r#"{"history_size": 20}"#).unwrap();
        assert_eq!(config.history_size, 20);
        assert_eq!(config.snapshot_interval_secs, 10);
    }

    #[test]
    fn bad_thresholds_read_as_zero() {
        let config = PlaybackConfig {
            restart_threshold_secs: f64::NAN,
            ..Default::default()
        };
        assert_eq!(config.restart_threshold(), Duration::ZERO);
    }
}

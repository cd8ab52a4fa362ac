//! Platform-agnostic media sink trait
//!
//! Abstracts the two media elements (audio and video) the host supplies.
//! The engine only relies on this capability set.

use crate::error::Result;
use std::time::Duration;

/// Playback target for one kind of media
///
/// Implementors wrap a real player (browser media element, native decoder,
/// headless stub). Loading a new URI must cancel any load still in flight.
pub trait MediaSink: Send {
    /// Point the sink at a new media URI
    ///
    /// # Errors
    /// Returns `PlaybackError::Media` if the source cannot be opened
    fn load(&mut self, uri: &str) -> Result<()>;

    /// Start or resume playback
    ///
    /// # Errors
    /// Returns `PlaybackError::Media` if playback cannot start
    /// (unreachable source, autoplay refused, ...)
    fn play(&mut self) -> Result<()>;

    /// Pause playback (no-op when already paused)
    fn pause(&mut self);

    /// Jump to a position from the start of the media
    fn seek(&mut self, position: Duration);

    /// Set output volume in [0, 1]
    fn set_volume(&mut self, volume: f32);

    /// Elapsed playback time
    fn position(&self) -> Duration;

    /// Total media duration, when known
    fn duration(&self) -> Option<Duration>;

    /// Restart from the beginning
    ///
    /// Equivalent to `seek(Duration::ZERO)`
    fn rewind(&mut self) {
        self.seek(Duration::ZERO);
    }
}

/// Notifications a sink delivers back to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// Media reached its natural end
    Ended,

    /// Periodic progress report
    TimeUpdate {
        position: Duration,
        duration: Option<Duration>,
    },

    /// Media failed to load or decode
    Error { message: String },
}

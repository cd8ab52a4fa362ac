//! AmorList - Playback Engine
//!
//! Platform-agnostic playback engine for AmorList.
//!
//! This crate provides:
//! - Active/base playlist traversal with wrap-around
//! - A user play queue that takes precedence over the playlist
//! - Shuffle that never interrupts the current track
//! - Repeat modes (Off, All, One)
//! - Bounded playback history (50 entries)
//! - Favorites, volume with mute memory, sleep timer
//! - Audio/video sink switching and resume snapshots
//!
//! # Architecture
//!
//! `amorlist-playback` has no I/O of its own:
//! - Media output goes through the [`MediaSink`] trait (one audio, one video)
//! - Persistence goes through [`amorlist_core::SessionStore`]
//! - State changes are buffered as [`PlaybackEvent`]s for the host to drain
//!
//! # Example
//!
//! ```rust
//! use amorlist_core::{MemorySessionStore, Track};
//! use amorlist_playback::{MediaSink, PlaybackConfig, PlaybackEngine, Result};
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct NullSink {
//!     position: Duration,
//! }
//!
//! impl MediaSink for NullSink {
//!     fn load(&mut self, _uri: &str) -> Result<()> {
//!         self.position = Duration::ZERO;
//!         Ok(())
//!     }
//!     fn play(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, position: Duration) {
//!         self.position = position;
//!     }
//!     fn set_volume(&mut self, _volume: f32) {}
//!     fn position(&self) -> Duration {
//!         self.position
//!     }
//!     fn duration(&self) -> Option<Duration> {
//!         None
//!     }
//! }
//!
//! let track = |id: &str| Track {
//!     id: id.to_string(),
//!     title: id.to_uppercase(),
//!     src: format!("/api/stream/{id}"),
//!     ..Default::default()
//! };
//!
//! let mut engine = PlaybackEngine::new(
//!     PlaybackConfig::default(),
//!     Box::new(NullSink::default()),
//!     Box::new(NullSink::default()),
//!     Box::new(MemorySessionStore::new()),
//! );
//!
//! engine.play(vec![track("a"), track("b"), track("c")], 0)?;
//! engine.enqueue(track("q"))?;
//! engine.next()?;
//! assert_eq!(engine.current_track().map(|t| t.id.as_str()), Some("q"));
//!
//! engine.next()?;
//! assert_eq!(engine.current_track().map(|t| t.id.as_str()), Some("b"));
//! # Ok::<(), amorlist_playback::PlaybackError>(())
//! ```

#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod queue;
pub mod shuffle;
pub mod sink;
pub mod sleep;
pub mod types;
pub mod volume;

pub use engine::{PlaybackEngine, FAVORITES_ALBUM_ID, HISTORY_ALBUM_ID};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use history::History;
pub use queue::PlayQueue;
pub use sink::{MediaSink, SinkEvent};
pub use sleep::SleepTimer;
pub use types::{Direction, PlaybackConfig, PlaybackStatus, RepeatMode, SinkKind};
pub use volume::Volume;

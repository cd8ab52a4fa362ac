//! Error types for playback management

use crate::types::SinkKind;
use thiserror::Error;

/// Playback errors
///
/// Navigation mistakes (empty playlist, stale index) are absorbed by the
/// engine and session store failures are logged, so neither shows up here.
/// Only sink failures and the duplicate-queue warning are reported.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The media sink could not load or start the source
    #[error("{sink} sink failed: {message}")]
    Media { sink: SinkKind, message: String },

    /// Track is already waiting in the play queue
    #[error("Track already queued: {0}")]
    DuplicateInQueue(String),
}

impl PlaybackError {
    /// Create a media error for a sink
    pub fn media(sink: SinkKind, message: impl Into<String>) -> Self {
        Self::Media {
            sink,
            message: message.into(),
        }
    }

    /// Whether the caller should only warn the user (state is unchanged)
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::DuplicateInQueue(_))
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

//! Playback history tracking
//!
//! Bounded list of played tracks, oldest first.

use amorlist_core::Track;
use std::collections::VecDeque;

/// Playback history with bounded size
///
/// The oldest entry is evicted once `max_size` is reached. A track is not
/// appended again if it is already the most recent entry.
#[derive(Debug, Clone)]
pub struct History {
    /// History buffer (most recent = back)
    tracks: VecDeque<Track>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            tracks: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Rebuild history from persisted entries (oldest first)
    ///
    /// Keeps the newest `max_size` entries.
    pub fn from_tracks(tracks: Vec<Track>, max_size: usize) -> Self {
        let mut history = Self::new(max_size);
        let skip = tracks.len().saturating_sub(max_size);
        history.tracks.extend(tracks.into_iter().skip(skip));
        history
    }

    /// Add track to history
    ///
    /// Returns `false` when the track was already the most recent entry.
    pub fn push(&mut self, track: Track) -> bool {
        if self.max_size == 0 {
            return false;
        }

        if self.tracks.back().is_some_and(|last| last.id == track.id) {
            return false;
        }

        if self.tracks.len() >= self.max_size {
            self.tracks.pop_front(); // Remove oldest
        }
        self.tracks.push_back(track);
        true
    }

    /// Get most recent track
    pub fn peek(&self) -> Option<&Track> {
        self.tracks.back()
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Snapshot for persistence (oldest first)
    pub fn to_vec(&self) -> Vec<Track> {
        self.tracks.iter().cloned().collect()
    }

    /// Most recent first
    pub fn recent_first(&self) -> Vec<Track> {
        self.tracks.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(50) // Default: 50 tracks
    }
}

//! Play queue
//!
//! FIFO of tracks waiting to be inserted right after the current track.
//!
//! ```text
//! Currently Playing: Track A
//! ─────────────────────────────
//! Queue (play next, FIFO):
//!   - Track X (user added)
//!   - Track Y (user added)
//! ─────────────────────────────
//! Rest of active playlist:
//!   - Track B
//!   - Track C
//! ```

use crate::error::{PlaybackError, Result};
use amorlist_core::Track;
use std::collections::VecDeque;

/// Queue of user-picked tracks, unique by track id
#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    tracks: VecDeque<Track>,
}

impl PlayQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append track to the tail
    ///
    /// # Errors
    /// `DuplicateInQueue` if a track with the same id is already queued;
    /// the queue is left unchanged.
    pub fn enqueue(&mut self, track: Track) -> Result<()> {
        if self.contains(&track.id) {
            return Err(PlaybackError::DuplicateInQueue(track.id));
        }
        self.tracks.push_back(track);
        Ok(())
    }

    /// Append every track not already queued, returning how many were added
    pub fn enqueue_all(&mut self, tracks: impl IntoIterator<Item = Track>) -> usize {
        tracks
            .into_iter()
            .filter_map(|track| self.enqueue(track).ok())
            .count()
    }

    /// Take the head of the queue
    pub fn pop_front(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    /// Remove the track at `position`
    ///
    /// Returns `None` (queue unchanged) when `position` is out of bounds.
    pub fn remove(&mut self, position: usize) -> Option<Track> {
        self.tracks.remove(position)
    }

    /// Peek at the head without removing
    pub fn peek(&self) -> Option<&Track> {
        self.tracks.front()
    }

    pub fn get(&self, position: usize) -> Option<&Track> {
        self.tracks.get(position)
    }

    /// Whether a track with this id is queued
    pub fn contains(&self, track_id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == track_id)
    }

    /// Queue order (head first)
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

//! Session persistence trait
//!
//! Favorites, history, volume and the resume snapshot are saved through a
//! single collaborator instead of per-feature ad hoc writes. Calls are
//! synchronous because the playback engine is; implementations should keep
//! them cheap. Callers treat every write as best-effort.

use crate::error::{AmorError, Result};
use crate::types::{PlaybackSnapshot, Track};
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage for the per-session playback state
pub trait SessionStore: Send {
    /// Load the last resume snapshot, if any
    fn load_snapshot(&self) -> Result<Option<PlaybackSnapshot>>;

    /// Save the resume snapshot
    fn save_snapshot(&self, snapshot: &PlaybackSnapshot) -> Result<()>;

    /// Load favorite track IDs in the order they were liked
    fn load_favorites(&self) -> Result<Vec<String>>;

    /// Save favorite track IDs
    fn save_favorites(&self, ids: &[String]) -> Result<()>;

    /// Load play history (oldest first)
    fn load_history(&self) -> Result<Vec<Track>>;

    /// Save play history (oldest first)
    fn save_history(&self, history: &[Track]) -> Result<()>;

    /// Load the last volume level
    fn load_volume(&self) -> Result<Option<f32>>;

    /// Save the volume level
    fn save_volume(&self, volume: f32) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: Option<PlaybackSnapshot>,
    favorites: Vec<String>,
    history: Vec<Track>,
    volume: Option<f32>,
    writes: usize,
    fail_writes: bool,
}

/// In-memory session store
///
/// Clones share the same state, so a host (or a test) can keep a handle and
/// inspect what the engine saved.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (simulates quota/unavailable storage)
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_writes = fail;
        }
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.inner.lock().map(|s| s.writes).unwrap_or(0)
    }

    /// Last saved snapshot
    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        self.inner.lock().ok().and_then(|s| s.snapshot.clone())
    }

    /// Last saved favorites
    pub fn favorites(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|s| s.favorites.clone())
            .unwrap_or_default()
    }

    /// Last saved history
    pub fn history(&self) -> Vec<Track> {
        self.inner
            .lock()
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    /// Last saved volume
    pub fn volume(&self) -> Option<f32> {
        self.inner.lock().ok().and_then(|s| s.volume)
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.inner
            .lock()
            .map_err(|_| AmorError::storage("session store lock poisoned"))
    }

    fn write(&self, apply: impl FnOnce(&mut MemoryState)) -> Result<()> {
        let mut state = self.state()?;
        if state.fail_writes {
            return Err(AmorError::storage("quota exceeded"));
        }
        apply(&mut state);
        state.writes += 1;
        Ok(())
    }
}

impl SessionStore for MemorySessionStore {
    fn load_snapshot(&self) -> Result<Option<PlaybackSnapshot>> {
        Ok(self.state()?.snapshot.clone())
    }

    fn save_snapshot(&self, snapshot: &PlaybackSnapshot) -> Result<()> {
        self.write(|s| s.snapshot = Some(snapshot.clone()))
    }

    fn load_favorites(&self) -> Result<Vec<String>> {
        Ok(self.state()?.favorites.clone())
    }

    fn save_favorites(&self, ids: &[String]) -> Result<()> {
        self.write(|s| s.favorites = ids.to_vec())
    }

    fn load_history(&self) -> Result<Vec<Track>> {
        Ok(self.state()?.history.clone())
    }

    fn save_history(&self, history: &[Track]) -> Result<()> {
        self.write(|s| s.history = history.to_vec())
    }

    fn load_volume(&self) -> Result<Option<f32>> {
        Ok(self.state()?.volume)
    }

    fn save_volume(&self, volume: f32) -> Result<()> {
        self.write(|s| s.volume = Some(volume))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let store = MemorySessionStore::new();
        let handle = store.clone();

        store.save_favorites(&["a".to_string()]).unwrap();
        assert_eq!(handle.favorites(), vec!["a".to_string()]);
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn failing_writes_leave_state_untouched() {
        let store = MemorySessionStore::new();
        store.save_volume(0.4).unwrap();

        store.set_fail_writes(true);
        assert!(store.save_volume(0.9).is_err());
        assert_eq!(store.volume(), Some(0.4));

        store.set_fail_writes(false);
        store.save_volume(0.9).unwrap();
        assert_eq!(store.volume(), Some(0.9));
    }
}

//! Session persistence as JSON files
//!
//! One file per concern under the data directory. Loads are synchronous and
//! happen once at startup. Saves are encoded on the caller's thread and
//! handed to a background writer, so the engine never waits on the disk.

mod writer;

use crate::json_file;
use amorlist_core::{PlaybackSnapshot, Result, SessionStore, Track};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use writer::SessionWriter;

pub const STATE_FILE: &str = "state.json";
pub const LIKES_FILE: &str = "likes.json";
pub const HISTORY_FILE: &str = "history.json";
pub const VOLUME_FILE: &str = "volume.json";

/// File-backed [`SessionStore`]
///
/// Clones share one writer thread. Writes that are still pending when the
/// last clone is dropped are flushed before the drop returns.
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    dir: PathBuf,
    writer: Arc<SessionWriter>,
}

impl JsonSessionStore {
    /// Open a store rooted at `dir` and start its writer thread
    ///
    /// # Errors
    /// Fails only if the writer thread cannot be spawned.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let writer = SessionWriter::spawn(dir.clone())?;
        Ok(Self {
            dir,
            writer: Arc::new(writer),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Block until every save issued so far has landed (or failed)
    ///
    /// Must not be called from inside an async task.
    pub fn flush(&self) {
        self.writer.flush();
    }

    /// Missing and unreadable files both mean "nothing saved"
    fn load<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        match json_file::read_sync(&self.dir.join(file)) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring unreadable {}: {}", file, e);
                None
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&self, file: &'static str, value: &T) -> Result<()> {
        let bytes = json_file::encode(&self.dir.join(file), value)?;
        self.writer.submit(file, bytes);
        Ok(())
    }
}

impl SessionStore for JsonSessionStore {
    fn load_snapshot(&self) -> Result<Option<PlaybackSnapshot>> {
        Ok(self.load(STATE_FILE))
    }

    fn save_snapshot(&self, snapshot: &PlaybackSnapshot) -> Result<()> {
        self.save(STATE_FILE, snapshot)
    }

    fn load_favorites(&self) -> Result<Vec<String>> {
        Ok(self.load(LIKES_FILE).unwrap_or_default())
    }

    fn save_favorites(&self, ids: &[String]) -> Result<()> {
        self.save(LIKES_FILE, ids)
    }

    fn load_history(&self) -> Result<Vec<Track>> {
        Ok(self.load(HISTORY_FILE).unwrap_or_default())
    }

    fn save_history(&self, history: &[Track]) -> Result<()> {
        self.save(HISTORY_FILE, history)
    }

    fn load_volume(&self) -> Result<Option<f32>> {
        Ok(self.load::<f32>(VOLUME_FILE).filter(|v| v.is_finite()))
    }

    fn save_volume(&self, volume: f32) -> Result<()> {
        self.save(VOLUME_FILE, &volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directory_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path()).unwrap();

        assert!(store.load_snapshot().unwrap().is_none());
        assert!(store.load_favorites().unwrap().is_empty());
        assert!(store.load_history().unwrap().is_empty());
        assert_eq!(store.load_volume().unwrap(), None);
    }

    #[test]
    fn corrupt_likes_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LIKES_FILE), "[1, 2").unwrap();

        let store = JsonSessionStore::new(dir.path()).unwrap();
        assert!(store.load_favorites().unwrap().is_empty());
    }

    #[test]
    fn failed_write_is_not_reported_to_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let store = JsonSessionStore::new(&missing).unwrap();

        assert!(store.save_volume(0.5).is_ok());
        store.flush();
        assert!(!missing.join(VOLUME_FILE).exists());
    }

    #[test]
    fn drop_flushes_pending_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path()).unwrap();
        store.save_favorites(&["a".to_string()]).unwrap();
        drop(store);

        let store = JsonSessionStore::new(dir.path()).unwrap();
        assert_eq!(store.load_favorites().unwrap(), vec!["a"]);
    }
}

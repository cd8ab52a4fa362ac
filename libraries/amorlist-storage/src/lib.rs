//! AmorList Storage
//!
//! JSON-file persistence for AmorList.
//!
//! Every concern owns one file under a single data directory:
//!
//! | File | Owner |
//! |---|---|
//! | `state.json`, `likes.json`, `history.json`, `volume.json` | [`JsonSessionStore`] |
//! | `playlists.json` | [`JsonPlaylistStore`] |
//! | `stats.json` | [`JsonStatsStore`] |
//! | `library.json` | [`JsonLibraryCache`] |
//!
//! # Example
//!
//! ```rust,no_run
//! use amorlist_core::{CreatePlaylist, PlaylistStore};
//! use amorlist_storage::JsonStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = JsonStorage::open("./data").await?;
//!
//! let playlist = storage
//!     .playlists()
//!     .create(CreatePlaylist::named("Late night"))
//!     .await?;
//! assert!(playlist.id.starts_with("pl_"));
//! # Ok(())
//! # }
//! ```

mod error;
mod json_file;

pub mod library;
pub mod playlists;
pub mod session;
pub mod stats;

pub use error::StorageError;
pub use library::JsonLibraryCache;
pub use playlists::JsonPlaylistStore;
pub use session::JsonSessionStore;
pub use stats::JsonStatsStore;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// All JSON stores rooted at one data directory
pub struct JsonStorage {
    dir: PathBuf,
    library: Arc<JsonLibraryCache>,
    playlists: JsonPlaylistStore,
    stats: JsonStatsStore,
}

impl JsonStorage {
    /// Open (creating if needed) the data directory
    pub async fn open(dir: impl AsRef<Path>) -> amorlist_core::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        info!("Using data directory {}", dir.display());

        let library = Arc::new(JsonLibraryCache::new(&dir));
        Ok(Self {
            playlists: JsonPlaylistStore::new(&dir),
            stats: JsonStatsStore::new(&dir, library.clone()),
            library,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A new session store handle (the engine takes ownership of it)
    ///
    /// # Errors
    /// Fails if the session writer thread cannot be started.
    pub fn session(&self) -> amorlist_core::Result<JsonSessionStore> {
        JsonSessionStore::new(&self.dir)
    }

    pub fn library(&self) -> &JsonLibraryCache {
        &self.library
    }

    pub fn playlists(&self) -> &JsonPlaylistStore {
        &self.playlists
    }

    pub fn stats(&self) -> &JsonStatsStore {
        &self.stats
    }
}

//! Collaborator traits for AmorList
//!
//! The playback engine never talks to Drive, HTTP or disk directly. Library
//! loading, custom playlists and play statistics live behind these traits so
//! the backend (JSON files, a remote API, test doubles) can be swapped.

use crate::error::Result;
use crate::types::{Album, CreatePlaylist, CustomPlaylist, PlaylistPatch, TopTrack};
use async_trait::async_trait;

/// Source of the album library
#[async_trait]
pub trait LibraryProvider: Send + Sync {
    /// Get the albums, served from cache when available
    async fn fetch_albums(&self) -> Result<Vec<Album>>;

    /// Discard any cached copy and rebuild the album list
    async fn force_rescan(&self) -> Result<Vec<Album>>;
}

/// CRUD over named custom playlists
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Get all playlists in creation order
    async fn list(&self) -> Result<Vec<CustomPlaylist>>;

    /// Get a playlist by ID
    async fn get(&self, id: &str) -> Result<Option<CustomPlaylist>>;

    /// Create a new playlist
    ///
    /// # Errors
    /// `InvalidInput` when the trimmed name is empty
    async fn create(&self, playlist: CreatePlaylist) -> Result<CustomPlaylist>;

    /// Rename and/or replace the songs of a playlist
    ///
    /// # Errors
    /// `NotFound` when no playlist has this ID
    async fn update(&self, id: &str, patch: PlaylistPatch) -> Result<CustomPlaylist>;

    /// Delete a playlist, returning what was removed
    ///
    /// # Errors
    /// `NotFound` when no playlist has this ID
    async fn delete(&self, id: &str) -> Result<CustomPlaylist>;
}

/// Play-count statistics
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Count one play of a track
    ///
    /// Invoked by whoever streams the media, not by the playback engine.
    async fn record_play(&self, track_id: &str) -> Result<()>;

    /// Most played tracks, most played first
    async fn top_played(&self) -> Result<Vec<TopTrack>>;
}

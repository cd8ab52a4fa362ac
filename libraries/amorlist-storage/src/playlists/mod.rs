//! Custom playlists stored in `playlists.json`
//!
//! The whole list is read, modified and written back under a lock, so
//! concurrent calls on one store never lose an update.

use crate::error::StorageError;
use crate::json_file;
use amorlist_core::{CreatePlaylist, CustomPlaylist, PlaylistPatch, PlaylistStore, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

pub const PLAYLISTS_FILE: &str = "playlists.json";

/// File-backed [`PlaylistStore`]
#[derive(Debug)]
pub struct JsonPlaylistStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonPlaylistStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(PLAYLISTS_FILE),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> crate::error::Result<Vec<CustomPlaylist>> {
        Ok(json_file::read(&self.path).await?.unwrap_or_default())
    }

    async fn save(&self, playlists: &[CustomPlaylist]) -> crate::error::Result<()> {
        json_file::write(&self.path, playlists).await
    }
}

fn new_playlist_id() -> String {
    format!("pl_{}", uuid::Uuid::new_v4().simple())
}

fn validated_name(name: &str) -> crate::error::Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StorageError::InvalidInput(
            "playlist name cannot be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

#[async_trait]
impl PlaylistStore for JsonPlaylistStore {
    async fn list(&self) -> Result<Vec<CustomPlaylist>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?)
    }

    async fn get(&self, id: &str) -> Result<Option<CustomPlaylist>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().find(|p| p.id == id))
    }

    async fn create(&self, playlist: CreatePlaylist) -> Result<CustomPlaylist> {
        let name = validated_name(&playlist.name)?;

        let _guard = self.lock.lock().await;
        let mut playlists = self.load().await?;

        let now = Utc::now();
        let created = CustomPlaylist {
            id: new_playlist_id(),
            name,
            songs: playlist.songs,
            created_at: now,
            updated_at: now,
        };
        playlists.push(created.clone());
        self.save(&playlists).await?;

        info!("Created playlist '{}' ({})", created.name, created.id);
        Ok(created)
    }

    async fn update(&self, id: &str, patch: PlaylistPatch) -> Result<CustomPlaylist> {
        let name = patch.name.as_deref().map(validated_name).transpose()?;

        let _guard = self.lock.lock().await;
        let mut playlists = self.load().await?;

        let playlist = playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found("Playlist", id))?;

        if let Some(name) = name {
            playlist.name = name;
        }
        if let Some(songs) = patch.songs {
            playlist.songs = songs;
        }
        playlist.updated_at = Utc::now();

        let updated = playlist.clone();
        self.save(&playlists).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<CustomPlaylist> {
        let _guard = self.lock.lock().await;
        let mut playlists = self.load().await?;

        let position = playlists
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found("Playlist", id))?;
        let removed = playlists.remove(position);
        self.save(&playlists).await?;

        info!("Deleted playlist '{}' ({})", removed.name, removed.id);
        Ok(removed)
    }
}

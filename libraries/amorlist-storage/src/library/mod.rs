//! Album library cache (`library.json`)
//!
//! The scanner that produces albums lives outside this workspace; it writes
//! the cache through [`JsonLibraryCache::save`] and the player reads it back.

use crate::json_file;
use amorlist_core::{Album, LibraryProvider, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const LIBRARY_FILE: &str = "library.json";

/// File-backed [`LibraryProvider`] with an in-memory copy
#[derive(Debug)]
pub struct JsonLibraryCache {
    path: PathBuf,
    albums: RwLock<Option<Vec<Album>>>,
}

impl JsonLibraryCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(LIBRARY_FILE),
            albums: RwLock::new(None),
        }
    }

    /// Replace the cached library on disk and in memory
    pub async fn save(&self, albums: Vec<Album>) -> Result<()> {
        let mut cached = self.albums.write().await;
        json_file::write(&self.path, &albums).await?;
        info!("Library cache saved: {} albums", albums.len());
        *cached = Some(albums);
        Ok(())
    }

    async fn read_from_disk(&self) -> Result<Vec<Album>> {
        let albums: Vec<Album> = json_file::read(&self.path).await?.unwrap_or_default();
        debug!("Read {} albums from {}", albums.len(), self.path.display());
        Ok(albums)
    }
}

#[async_trait]
impl LibraryProvider for JsonLibraryCache {
    async fn fetch_albums(&self) -> Result<Vec<Album>> {
        if let Some(albums) = self.albums.read().await.as_ref() {
            return Ok(albums.clone());
        }

        let mut cached = self.albums.write().await;
        if let Some(albums) = cached.as_ref() {
            return Ok(albums.clone());
        }
        let albums = self.read_from_disk().await?;
        *cached = Some(albums.clone());
        Ok(albums)
    }

    async fn force_rescan(&self) -> Result<Vec<Album>> {
        let mut cached = self.albums.write().await;
        *cached = None;
        let albums = self.read_from_disk().await?;
        *cached = Some(albums.clone());
        Ok(albums)
    }
}

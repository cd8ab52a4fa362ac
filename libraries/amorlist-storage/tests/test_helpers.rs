//! Test helpers and fixtures for storage integration tests
//!
//! Every test gets its own temporary data directory that is removed on drop.

#![allow(dead_code)]

use amorlist_core::{Album, Track};
use amorlist_storage::JsonStorage;
use tempfile::TempDir;

/// Storage rooted in a temporary directory
pub struct TestStorage {
    pub storage: JsonStorage,
    pub dir: TempDir,
}

impl TestStorage {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = JsonStorage::open(dir.path())
            .await
            .expect("Failed to open storage");
        Self { storage, dir }
    }
}

pub fn create_test_track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        title: format!("Track {id}"),
        artist: "Test Artist".to_string(),
        album: "Test Album".to_string(),
        src: format!("/api/stream/{id}"),
        cover: String::new(),
        is_video: false,
    }
}

pub fn create_test_album(id: &str, track_ids: &[&str]) -> Album {
    Album::new(
        id,
        format!("Album {id}"),
        format!("/api/image/{id}"),
        track_ids.iter().map(|t| create_test_track(t)).collect(),
    )
}

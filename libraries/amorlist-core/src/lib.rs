//! AmorList Core
//!
//! Platform-agnostic core types, traits, and error handling for AmorList.
//!
//! This crate provides the building blocks shared by the playback engine,
//! the JSON storage layer and the host applications.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Album`, `CustomPlaylist`, `PlayStats`, `PlaybackSnapshot`
//! - **Collaborator Traits**: `LibraryProvider`, `PlaylistStore`, `StatsProvider`, `SessionStore`
//! - **Error Handling**: Unified `AmorError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use amorlist_core::types::{Album, Track};
//!
//! let track = Track {
//!     id: "t1".to_string(),
//!     title: "Blurry Eyes".to_string(),
//!     artist: "L'Arc~en~Ciel".to_string(),
//!     album: "Tierra".to_string(),
//!     src: "/api/stream/t1".to_string(),
//!     cover: "/api/image/c1".to_string(),
//!     is_video: false,
//! };
//!
//! let album = Album::new("a1", "Tierra", "/api/image/c1", vec![track]);
//! assert_eq!(album.songs.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{AmorError, Result};
pub use storage::{MemorySessionStore, SessionStore};
pub use traits::{LibraryProvider, PlaylistStore, StatsProvider};

pub use types::{
    Album, CreatePlaylist, CustomPlaylist, PlayStats, PlaybackSnapshot, PlaylistPatch, TopTrack,
    Track,
};

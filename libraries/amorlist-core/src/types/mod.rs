//! Domain types shared by the engine, storage and hosts

mod playlist;
mod session;
mod stats;
mod track;

pub use playlist::{CreatePlaylist, CustomPlaylist, PlaylistPatch};
pub use session::PlaybackSnapshot;
pub use stats::{PlayStats, TopTrack};
pub use track::{Album, Track};

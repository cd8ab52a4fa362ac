//! Play counts (`stats.json`) and the "top songs" view

use crate::json_file;
use amorlist_core::{LibraryProvider, PlayStats, Result, StatsProvider, TopTrack, Track};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const STATS_FILE: &str = "stats.json";

/// Number of tracks returned by `top_played`
pub const TOP_LIMIT: usize = 20;

/// File-backed [`StatsProvider`]
///
/// Counts are joined with the library when read, so tracks that left the
/// library drop out of the top list.
pub struct JsonStatsStore {
    path: PathBuf,
    library: Arc<dyn LibraryProvider>,
    lock: Mutex<()>,
}

impl JsonStatsStore {
    pub fn new(dir: impl AsRef<Path>, library: Arc<dyn LibraryProvider>) -> Self {
        Self {
            path: dir.as_ref().join(STATS_FILE),
            library,
            lock: Mutex::new(()),
        }
    }

    /// Raw counts as stored
    pub async fn stats(&self) -> Result<PlayStats> {
        let _guard = self.lock.lock().await;
        Ok(json_file::read(&self.path).await?.unwrap_or_default())
    }
}

#[async_trait]
impl StatsProvider for JsonStatsStore {
    async fn record_play(&self, track_id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut stats: PlayStats = json_file::read(&self.path).await?.unwrap_or_default();
        stats.record(track_id, Utc::now());
        json_file::write(&self.path, &stats).await?;
        Ok(())
    }

    async fn top_played(&self) -> Result<Vec<TopTrack>> {
        let stats = self.stats().await?;
        let albums = self.library.fetch_albums().await?;

        let by_id: HashMap<&str, &Track> = albums
            .iter()
            .flat_map(|album| album.songs.iter())
            .map(|track| (track.id.as_str(), track))
            .collect();

        Ok(rank(&stats, &by_id))
    }
}

fn rank(stats: &PlayStats, library: &HashMap<&str, &Track>) -> Vec<TopTrack> {
    let mut top: Vec<TopTrack> = stats
        .plays
        .iter()
        .filter_map(|(id, &play_count)| {
            library.get(id.as_str()).map(|track| TopTrack {
                track: (*track).clone(),
                play_count,
            })
        })
        .collect();

    // Ties broken by id so the order is stable across runs
    top.sort_by(|a, b| {
        b.play_count
            .cmp(&a.play_count)
            .then_with(|| a.track.id.cmp(&b.track.id))
    });
    top.truncate(TOP_LIMIT);
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: id.to_string(),
            src: format!("/api/stream/{id}"),
            ..Default::default()
        }
    }

    #[test]
    fn rank_sorts_and_drops_unknown_ids() {
        let library_tracks = [track("a"), track("b")];
        let library: HashMap<&str, &Track> =
            library_tracks.iter().map(|t| (t.id.as_str(), t)).collect();

        let mut stats = PlayStats::default();
        let now = Utc::now();
        stats.record("a", now);
        for _ in 0..3 {
            stats.record("b", now);
        }
        stats.record("removed", now);

        let top = rank(&stats, &library);
        let ids: Vec<_> = top.iter().map(|t| t.track.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(top[0].play_count, 3);
    }

    #[test]
    fn rank_keeps_top_twenty() {
        let library_tracks: Vec<Track> = (0..30).map(|i| track(&format!("t{i:02}"))).collect();
        let library: HashMap<&str, &Track> =
            library_tracks.iter().map(|t| (t.id.as_str(), t)).collect();

        let mut stats = PlayStats::default();
        let now = Utc::now();
        for (i, t) in library_tracks.iter().enumerate() {
            for _ in 0..=i {
                stats.record(&t.id, now);
            }
        }

        let top = rank(&stats, &library);
        assert_eq!(top.len(), TOP_LIMIT);
        assert_eq!(top[0].track.id, "t29");
        assert_eq!(top[19].track.id, "t10");
    }
}

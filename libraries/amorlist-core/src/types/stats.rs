//! Play-count statistics

use crate::types::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Play counts per track id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayStats {
    /// Play count keyed by track id
    #[serde(default)]
    pub plays: HashMap<String, u64>,
    /// When the last play was recorded
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PlayStats {
    /// Count one more play of `track_id`
    pub fn record(&mut self, track_id: &str, at: DateTime<Utc>) {
        *self.plays.entry(track_id.to_string()).or_insert(0) += 1;
        self.last_updated = Some(at);
    }

    /// Plays recorded for `track_id`
    pub fn count(&self, track_id: &str) -> u64 {
        self.plays.get(track_id).copied().unwrap_or(0)
    }
}

/// A track together with how often it was played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTrack {
    /// The track itself, flattened on the wire
    #[serde(flatten)]
    pub track: Track,
    /// Number of recorded plays
    pub play_count: u64,
}

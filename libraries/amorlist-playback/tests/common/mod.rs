//! Shared fixtures for playback integration tests

#![allow(dead_code)]

use amorlist_core::{MemorySessionStore, Track};
use amorlist_playback::{MediaSink, PlaybackConfig, PlaybackEngine, PlaybackError, Result, SinkKind};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Everything a sink was asked to do, for assertions
#[derive(Debug, Default)]
pub struct SinkLog {
    pub loads: Vec<String>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub fail_play: bool,
}

/// Recording sink; clones share the same log
#[derive(Clone)]
pub struct RecordingSink {
    kind: SinkKind,
    log: Arc<Mutex<SinkLog>>,
}

impl RecordingSink {
    pub fn new(kind: SinkKind) -> Self {
        Self {
            kind,
            log: Arc::default(),
        }
    }

    pub fn log(&self) -> MutexGuard<'_, SinkLog> {
        self.log.lock().unwrap()
    }

    pub fn set_position(&self, secs: u64) {
        self.log().position = Duration::from_secs(secs);
    }
}

impl MediaSink for RecordingSink {
    fn load(&mut self, uri: &str) -> Result<()> {
        let mut log = self.log();
        log.loads.push(uri.to_string());
        log.playing = false;
        log.position = Duration::ZERO;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut log = self.log();
        if log.fail_play {
            return Err(PlaybackError::media(self.kind, "source unreachable"));
        }
        log.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.log().playing = false;
    }

    fn seek(&mut self, position: Duration) {
        self.log().position = position;
    }

    fn set_volume(&mut self, volume: f32) {
        self.log().volume = volume;
    }

    fn position(&self) -> Duration {
        self.log().position
    }

    fn duration(&self) -> Option<Duration> {
        self.log().duration
    }
}

pub struct TestRig {
    pub engine: PlaybackEngine,
    pub audio: RecordingSink,
    pub video: RecordingSink,
    pub store: MemorySessionStore,
}

pub fn rig_with_store(store: MemorySessionStore) -> TestRig {
    let audio = RecordingSink::new(SinkKind::Audio);
    let video = RecordingSink::new(SinkKind::Video);
    let engine = PlaybackEngine::new(
        PlaybackConfig::default(),
        Box::new(audio.clone()),
        Box::new(video.clone()),
        Box::new(store.clone()),
    );
    TestRig {
        engine,
        audio,
        video,
        store,
    }
}

pub fn rig() -> TestRig {
    rig_with_store(MemorySessionStore::new())
}

pub fn create_test_track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        title: format!("Track {id}"),
        artist: "Test Artist".to_string(),
        album: "Test Album".to_string(),
        src: format!("/api/stream/{id}"),
        cover: format!("/api/image/{id}"),
        is_video: false,
    }
}

pub fn create_test_video(id: &str) -> Track {
    Track {
        is_video: true,
        ..create_test_track(id)
    }
}

pub fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| create_test_track(id)).collect()
}

pub fn ids(list: &[Track]) -> Vec<String> {
    list.iter().map(|t| t.id.clone()).collect()
}

pub fn current_id(engine: &PlaybackEngine) -> Option<String> {
    engine.current_track().map(|t| t.id.clone())
}

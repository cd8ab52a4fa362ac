//! Headless media sink
//!
//! No audio device: a simulated clock that the session advances with `tick`.
//! Each sink shares its state with a [`HeadlessClock`] handle so the session
//! loop can move time forward while the engine owns the sink.

use amorlist_playback::{MediaSink, PlaybackError, Result, SinkEvent, SinkKind};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Length assumed for every headless track
pub const TRACK_LENGTH: Duration = Duration::from_secs(180);

/// Progress reports are sent at this cadence while ticking
const TICK_STEP: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct HeadlessState {
    uri: Option<String>,
    playing: bool,
    position: Duration,
    volume: f32,
}

/// Sink half, handed to the engine
pub struct HeadlessSink {
    kind: SinkKind,
    state: Arc<Mutex<HeadlessState>>,
}

/// Clock half, kept by the session loop
#[derive(Clone)]
pub struct HeadlessClock {
    state: Arc<Mutex<HeadlessState>>,
}

/// Create a connected sink/clock pair
pub fn headless(kind: SinkKind) -> (HeadlessSink, HeadlessClock) {
    let state = Arc::new(Mutex::new(HeadlessState {
        volume: 1.0,
        ..Default::default()
    }));
    (
        HeadlessSink {
            kind,
            state: state.clone(),
        },
        HeadlessClock { state },
    )
}

fn lock(state: &Mutex<HeadlessState>) -> MutexGuard<'_, HeadlessState> {
    // A panic while holding this lock cannot leave the plain data invalid
    state
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl HeadlessSink {
    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        lock(&self.state)
    }
}

impl MediaSink for HeadlessSink {
    fn load(&mut self, uri: &str) -> Result<()> {
        if uri.trim().is_empty() {
            return Err(PlaybackError::media(self.kind, "empty media URI"));
        }
        let mut state = self.state();
        state.uri = Some(uri.to_string());
        state.playing = false;
        state.position = Duration::ZERO;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.state();
        if state.uri.is_none() {
            return Err(PlaybackError::media(self.kind, "nothing loaded"));
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.state().playing = false;
    }

    fn seek(&mut self, position: Duration) {
        self.state().position = position.min(TRACK_LENGTH);
    }

    fn set_volume(&mut self, volume: f32) {
        self.state().volume = volume;
    }

    fn position(&self) -> Duration {
        self.state().position
    }

    fn duration(&self) -> Option<Duration> {
        self.state().uri.as_ref().map(|_| TRACK_LENGTH)
    }
}

impl HeadlessClock {
    /// Advance playback by `elapsed`, returning what a real element would
    /// have reported
    ///
    /// Stops at the end of the track; a stopped or paused sink reports nothing.
    pub fn advance(&self, elapsed: Duration) -> Vec<SinkEvent> {
        let mut state = lock(&self.state);
        let mut events = Vec::new();
        if !state.playing {
            return events;
        }

        let mut remaining = elapsed;
        while !remaining.is_zero() {
            let step = remaining.min(TICK_STEP);
            remaining -= step;
            state.position = (state.position + step).min(TRACK_LENGTH);
            events.push(SinkEvent::TimeUpdate {
                position: state.position,
                duration: Some(TRACK_LENGTH),
            });

            if state.position >= TRACK_LENGTH {
                state.playing = false;
                events.push(SinkEvent::Ended);
                break;
            }
        }
        events
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.state).playing
    }

    pub fn volume(&self) -> f32 {
        lock(&self.state).volume
    }
}

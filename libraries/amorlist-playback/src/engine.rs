//! Playback engine - core orchestration
//!
//! Single authority over what plays next and what is currently loaded.
//! Coordinates the active playlist, play queue, history, favorites, volume
//! and the two media sinks. All methods are synchronous; I/O goes through
//! the session store and is best-effort.

use crate::{
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    history::History,
    queue::PlayQueue,
    shuffle::{shuffle_keeping_current, shuffled},
    sink::{MediaSink, SinkEvent},
    sleep::SleepTimer,
    types::{Direction, PlaybackConfig, PlaybackStatus, RepeatMode, SinkKind},
    volume::Volume,
};
use amorlist_core::{Album, CustomPlaylist, PlaybackSnapshot, SessionStore, Track};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// ID of the favorites pseudo-album
pub const FAVORITES_ALBUM_ID: &str = "favorites";

/// ID of the history pseudo-album
pub const HISTORY_ALBUM_ID: &str = "history";

/// Central playback engine
///
/// Owns the whole playback state:
/// - Library (set wholesale by the host)
/// - Active playlist (possibly shuffled) and the unshuffled base playlist
/// - Current index, status and which sink is driving playback
/// - Shuffle flag and repeat mode (Off, All, One)
/// - Play queue, history and favorites
/// - Volume and sleep timer
///
/// Navigation on an empty playlist or with a stale index is a silent no-op.
/// Only sink failures are returned as errors, and they never trigger an
/// automatic skip.
pub struct PlaybackEngine {
    config: PlaybackConfig,

    // Library and traversal
    library: Vec<Album>,
    active: Vec<Track>,
    base: Vec<Track>,
    current_index: Option<usize>,

    // State
    status: PlaybackStatus,
    sink_kind: SinkKind,
    shuffle: bool,
    repeat: RepeatMode,

    // Queue, history, favorites
    queue: PlayQueue,
    history: History,
    favorites: Vec<String>,

    // Output
    volume: Volume,
    audio: Box<dyn MediaSink>,
    video: Box<dyn MediaSink>,

    store: Box<dyn SessionStore>,
    sleep_timer: SleepTimer,
    rng: StdRng,

    // Snapshot throttling: last elapsed-time bucket persisted
    last_snapshot_bucket: Option<u64>,

    // Track id whose successor was already announced for preloading
    preload_announced: Option<String>,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackEngine {
    /// Create the engine for a new session
    ///
    /// Favorites, history and volume are reloaded from `store`. A saved
    /// snapshot is loaded into the matching sink at its saved position but
    /// playback is NOT resumed.
    pub fn new(
        config: PlaybackConfig,
        audio: Box<dyn MediaSink>,
        video: Box<dyn MediaSink>,
        store: Box<dyn SessionStore>,
    ) -> Self {
        let favorites = store.load_favorites().unwrap_or_else(|e| {
            warn!("Failed to load favorites: {}", e);
            Vec::new()
        });

        let history = store.load_history().unwrap_or_else(|e| {
            warn!("Failed to load history: {}", e);
            Vec::new()
        });

        let level = match store.load_volume() {
            Ok(level) => level.unwrap_or(config.initial_volume),
            Err(e) => {
                warn!("Failed to load volume: {}", e);
                config.initial_volume
            }
        };

        let mut engine = Self {
            history: History::from_tracks(history, config.history_size),
            config,
            library: Vec::new(),
            active: Vec::new(),
            base: Vec::new(),
            current_index: None,
            status: PlaybackStatus::Stopped,
            sink_kind: SinkKind::Audio,
            shuffle: false,
            repeat: RepeatMode::Off,
            queue: PlayQueue::new(),
            favorites,
            volume: Volume::new(level),
            audio,
            video,
            store,
            sleep_timer: SleepTimer::new(),
            rng: StdRng::from_entropy(),
            last_snapshot_bucket: None,
            preload_announced: None,
            pending_events: Vec::new(),
        };

        engine.apply_volume();
        engine.restore_snapshot();
        engine
    }

    fn restore_snapshot(&mut self) {
        let snapshot = match self.store.load_snapshot() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to load playback snapshot: {}", e);
                return;
            }
        };

        let (playlist, index) = snapshot.restored_playlist();
        let track = playlist[index].clone();
        let kind = SinkKind::for_track(&track);

        self.base = playlist.clone();
        self.active = playlist;
        self.current_index = Some(index);
        self.sink_kind = kind;

        let elapsed = snapshot.elapsed();
        self.last_snapshot_bucket = Some(self.snapshot_bucket(elapsed));

        self.sink_mut(kind.other()).pause();
        let sink = self.sink_mut(kind);
        if let Err(e) = sink.load(&track.src) {
            warn!("Failed to reload '{}' at startup: {}", track.title, e);
        } else {
            sink.seek(elapsed);
            sink.pause();
        }

        info!(
            "Restored '{}' at {:.1}s ({} tracks)",
            track.title,
            elapsed.as_secs_f64(),
            self.active.len()
        );

        self.emit(PlaybackEvent::TrackChanged {
            track_id: track.id,
            previous_track_id: None,
            sink: kind,
        });
        self.set_status(PlaybackStatus::Paused);
    }

    // ===== Library =====

    /// Replace the library
    ///
    /// Does not touch the current playback.
    pub fn load_library(&mut self, albums: Vec<Album>) {
        debug!("Library loaded: {} albums", albums.len());
        self.library = albums;
    }

    pub fn library(&self) -> &[Album] {
        &self.library
    }

    // ===== Playback Control =====

    /// Start playing `playlist` at `index`
    ///
    /// The playlist becomes both the active and the base order. An empty
    /// playlist or out-of-range index is ignored.
    ///
    /// # Errors
    /// `PlaybackError::Media` if the sink cannot start; the track stays
    /// loaded and current, and nothing is skipped.
    pub fn play(&mut self, playlist: Vec<Track>, index: usize) -> Result<()> {
        if index >= playlist.len() {
            debug!(
                "Ignoring play at index {} of {}-track playlist",
                index,
                playlist.len()
            );
            return Ok(());
        }

        self.base.clone_from(&playlist);
        self.active = playlist;
        self.start_current(index)
    }

    /// "Play all" / "Shuffle all" for an album or playlist
    ///
    /// When `shuffled`, the songs keep their order as the base playlist and
    /// shuffle is switched on, so turning it off restores album order.
    pub fn play_all(&mut self, songs: Vec<Track>, shuffled_order: bool) -> Result<()> {
        if songs.is_empty() {
            debug!("Ignoring play-all of empty song list");
            return Ok(());
        }

        if !shuffled_order {
            return self.play(songs, 0);
        }

        self.active = shuffled(&songs, &mut self.rng);
        self.base = songs;
        if !self.shuffle {
            self.shuffle = true;
            self.emit(PlaybackEvent::ShuffleChanged { enabled: true });
        }
        self.start_current(0)
    }

    /// Play a library album by id
    pub fn play_album(&mut self, album_id: &str, index: usize) -> Result<()> {
        let Some(songs) = self
            .library
            .iter()
            .find(|a| a.id == album_id)
            .map(|a| a.songs.clone())
        else {
            debug!("Ignoring play of unknown album {}", album_id);
            return Ok(());
        };
        self.play(songs, index)
    }

    /// Play a custom playlist exactly like an album
    pub fn play_playlist(&mut self, playlist: &CustomPlaylist, index: usize) -> Result<()> {
        self.play(playlist.songs.clone(), index)
    }

    /// Play the history pseudo-album (most recent first)
    pub fn play_history(&mut self) -> Result<()> {
        self.play(self.history.recent_first(), 0)
    }

    /// Pause or resume the active sink
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.current_index.is_none() {
            debug!("Ignoring play/pause with nothing loaded");
            return Ok(());
        }

        let kind = self.sink_kind;
        if self.status == PlaybackStatus::Playing {
            self.sink_mut(kind).pause();
            self.set_status(PlaybackStatus::Paused);
            self.persist_snapshot();
            return Ok(());
        }

        match self.sink_mut(kind).play() {
            Ok(()) => {
                self.set_status(PlaybackStatus::Playing);
                Ok(())
            }
            Err(e) => Err(self.report_media_error(kind, e)),
        }
    }

    /// Skip to next track
    pub fn next(&mut self) -> Result<()> {
        self.advance(Direction::Next)
    }

    /// Go to previous track (or restart the current one)
    pub fn previous(&mut self) -> Result<()> {
        self.advance(Direction::Prev)
    }

    /// Manual navigation
    ///
    /// Next: a queued track is spliced in right after the current one and
    /// the spliced list is played from its head; otherwise the index moves
    /// forward with wrap-around.
    ///
    /// Prev: past the restart threshold the current track is rewound;
    /// otherwise the index moves back with wrap-around.
    ///
    /// Repeat mode does not affect this.
    pub fn advance(&mut self, direction: Direction) -> Result<()> {
        match direction {
            Direction::Next => self.advance_next(),
            Direction::Prev => self.advance_prev(),
        }
    }

    fn advance_next(&mut self) -> Result<()> {
        if let Some(queued) = self.queue.pop_front() {
            let rest = self
                .current_index
                .and_then(|i| self.active.get(i + 1..))
                .map(<[Track]>::to_vec)
                .unwrap_or_default();

            let mut spliced = Vec::with_capacity(rest.len() + 1);
            spliced.push(queued);
            spliced.extend(rest);

            self.emit(PlaybackEvent::QueueChanged {
                length: self.queue.len(),
            });
            return self.play(spliced, 0);
        }

        let Some(index) = self.current_index else {
            debug!("Ignoring next with nothing loaded");
            return Ok(());
        };

        let len = self.active.len();
        self.start_current((index + 1) % len)
    }

    fn advance_prev(&mut self) -> Result<()> {
        let Some(index) = self.current_index else {
            debug!("Ignoring previous with nothing loaded");
            return Ok(());
        };

        let kind = self.sink_kind;
        if self.sink(kind).position() > self.config.restart_threshold() {
            self.restart_current();
            return Ok(());
        }

        let len = self.active.len();
        self.start_current((index + len - 1) % len)
    }

    /// Called when the active sink reports natural end of media
    ///
    /// Repeat-one rewinds and resumes the same track; every other mode
    /// behaves exactly like `next()`.
    pub fn on_track_ended(&mut self) -> Result<()> {
        if self.current_index.is_none() {
            return Ok(());
        }

        if self.repeat != RepeatMode::One {
            return self.advance_next();
        }

        let kind = self.sink_kind;
        self.restart_current();
        match self.sink_mut(kind).play() {
            Ok(()) => {
                self.set_status(PlaybackStatus::Playing);
                Ok(())
            }
            Err(e) => Err(self.report_media_error(kind, e)),
        }
    }

    /// Route a notification from one of the sinks
    ///
    /// Events from the sink that is not driving playback are stale and
    /// ignored.
    pub fn handle_sink_event(&mut self, kind: SinkKind, event: SinkEvent) -> Result<()> {
        if kind != self.sink_kind || self.current_index.is_none() {
            debug!("Ignoring {:?} from inactive {} sink", event, kind);
            return Ok(());
        }

        match event {
            SinkEvent::Ended => self.on_track_ended(),
            SinkEvent::TimeUpdate { position, duration } => {
                self.on_time_update(position, duration);
                Ok(())
            }
            SinkEvent::Error { message } => {
                Err(self.report_media_error(kind, PlaybackError::media(kind, message)))
            }
        }
    }

    fn on_time_update(&mut self, position: Duration, duration: Option<Duration>) {
        self.emit(PlaybackEvent::Position {
            position_ms: position.as_millis() as u64,
            duration_ms: duration.map(|d| d.as_millis() as u64),
        });

        let bucket = self.snapshot_bucket(position);
        if self.last_snapshot_bucket != Some(bucket) {
            self.last_snapshot_bucket = Some(bucket);
            self.persist_snapshot();
        }

        if let Some(duration) = duration.filter(|d| !d.is_zero()) {
            let progress = position.as_secs_f64() / duration.as_secs_f64();
            if progress > self.config.preload_threshold {
                self.announce_preload();
            }
        }
    }

    fn announce_preload(&mut self) {
        let Some(index) = self.current_index else {
            return;
        };
        let current_id = &self.active[index].id;
        if self.preload_announced.as_ref() == Some(current_id) {
            return;
        }

        // No wrap-around: the first track is usually still buffered
        let Some(next) = self.active.get(index + 1).filter(|t| !t.is_video) else {
            return;
        };

        let event = PlaybackEvent::PreloadNext {
            track_id: next.id.clone(),
            src: next.src.clone(),
        };
        self.preload_announced = Some(current_id.clone());
        self.emit(event);
    }

    // ===== Seek =====

    /// Seek within the current track
    ///
    /// Clamped to the track duration when the sink knows it.
    pub fn seek(&mut self, position: Duration) {
        if self.current_index.is_none() {
            return;
        }

        let kind = self.sink_kind;
        let duration = self.sink(kind).duration();
        let position = duration.map_or(position, |d| position.min(d));

        self.sink_mut(kind).seek(position);
        self.last_snapshot_bucket = Some(self.snapshot_bucket(position));
        self.emit(PlaybackEvent::Position {
            position_ms: position.as_millis() as u64,
            duration_ms: duration.map(|d| d.as_millis() as u64),
        });
        self.persist_snapshot();
    }

    /// Seek relative to the current position (negative goes back)
    pub fn seek_relative(&mut self, delta_secs: f64) {
        if !delta_secs.is_finite() {
            return;
        }
        let current = self.position().as_secs_f64();
        let target = (current + delta_secs).max(0.0);
        self.seek(Duration::try_from_secs_f64(target).unwrap_or(Duration::ZERO));
    }

    /// Jump forward by the configured seek step
    pub fn seek_forward(&mut self) {
        self.seek_relative(self.config.seek_step().as_secs_f64());
    }

    /// Jump back by the configured seek step
    pub fn seek_backward(&mut self) {
        self.seek_relative(-self.config.seek_step().as_secs_f64());
    }

    fn restart_current(&mut self) {
        let kind = self.sink_kind;
        self.sink_mut(kind).rewind();
        self.last_snapshot_bucket = Some(0);
        self.preload_announced = None;
        let duration = self.sink(kind).duration();
        self.emit(PlaybackEvent::Position {
            position_ms: 0,
            duration_ms: duration.map(|d| d.as_millis() as u64),
        });
        self.persist_snapshot();
    }

    // ===== Shuffle & Repeat =====

    /// Toggle shuffle, returning the new state
    ///
    /// Enabling moves the current track to the front of a random
    /// permutation; disabling restores the base order. Either way the
    /// audible track does not change and playback is not interrupted.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;

        match (self.shuffle, self.current_index) {
            (true, Some(index)) => {
                self.active = shuffle_keeping_current(&self.active, index, &mut self.rng);
                self.current_index = Some(0);
            }
            (false, Some(index)) if !self.base.is_empty() => {
                let current_id = self.active[index].id.clone();
                self.active.clone_from(&self.base);
                self.current_index = Some(
                    self.active
                        .iter()
                        .position(|t| t.id == current_id)
                        .unwrap_or(0),
                );
            }
            _ => {}
        }

        self.emit(PlaybackEvent::ShuffleChanged {
            enabled: self.shuffle,
        });
        self.persist_snapshot();
        self.shuffle
    }

    /// Reseed the shuffle RNG (deterministic shuffles for tests and demos)
    pub fn reseed_shuffle(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Off → All → One → Off, returning the new mode
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycle();
        self.emit(PlaybackEvent::RepeatChanged { mode: self.repeat });
        self.repeat
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        if self.repeat != mode {
            self.repeat = mode;
            self.emit(PlaybackEvent::RepeatChanged { mode });
        }
    }

    // ===== Queue Management =====

    /// Append a track to the play queue
    ///
    /// # Errors
    /// `DuplicateInQueue` (a warning, state unchanged) if already queued
    pub fn enqueue(&mut self, track: Track) -> Result<()> {
        if let Err(e) = self.queue.enqueue(track) {
            debug!("{}", e);
            return Err(e);
        }
        self.emit_queue_changed();
        Ok(())
    }

    /// Queue every track not already queued, returning how many were added
    pub fn enqueue_all(&mut self, tracks: Vec<Track>) -> usize {
        let added = self.queue.enqueue_all(tracks);
        if added > 0 {
            self.emit_queue_changed();
        }
        added
    }

    /// Remove and return the queued track at `position`
    pub fn dequeue_at(&mut self, position: usize) -> Option<Track> {
        let track = self.queue.remove(position);
        if track.is_some() {
            self.emit_queue_changed();
        } else {
            debug!("Ignoring dequeue at {} of {}", position, self.queue.len());
        }
        track
    }

    pub fn clear_queue(&mut self) {
        if !self.queue.is_empty() {
            self.queue.clear();
            self.emit_queue_changed();
        }
    }

    /// Play a queued track on its own
    ///
    /// The track leaves the queue and becomes a one-track playlist; the
    /// previous playlist context is abandoned.
    pub fn play_from_queue(&mut self, position: usize) -> Result<()> {
        let Some(track) = self.queue.remove(position) else {
            debug!("Ignoring play of queue position {}", position);
            return Ok(());
        };
        self.emit_queue_changed();
        self.play(vec![track], 0)
    }

    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    fn emit_queue_changed(&mut self) {
        self.emit(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    // ===== Favorites & History =====

    /// Flip a track's favorite flag, returning whether it is now a favorite
    ///
    /// Favorites are saved immediately.
    pub fn toggle_favorite(&mut self, track_id: &str) -> bool {
        let favorite = match self.favorites.iter().position(|id| id == track_id) {
            Some(pos) => {
                self.favorites.remove(pos);
                false
            }
            None => {
                self.favorites.push(track_id.to_string());
                true
            }
        };

        if let Err(e) = self.store.save_favorites(&self.favorites) {
            warn!("Failed to save favorites: {}", e);
        }

        self.emit(PlaybackEvent::FavoriteChanged {
            track_id: track_id.to_string(),
            favorite,
        });
        favorite
    }

    /// Toggle the current track's favorite flag
    pub fn toggle_favorite_current(&mut self) -> Option<bool> {
        let id = self.current_track()?.id.clone();
        Some(self.toggle_favorite(&id))
    }

    pub fn is_favorite(&self, track_id: &str) -> bool {
        self.favorites.iter().any(|id| id == track_id)
    }

    /// Favorite ids in the order they were liked
    pub fn favorite_ids(&self) -> &[String] {
        &self.favorites
    }

    /// Favorited tracks in library order
    pub fn favorite_tracks(&self) -> Vec<Track> {
        self.library
            .iter()
            .flat_map(|album| album.songs.iter())
            .filter(|track| self.is_favorite(&track.id))
            .cloned()
            .collect()
    }

    /// Favorites pseudo-album
    pub fn favorites_album(&self) -> Album {
        Album::new(FAVORITES_ALBUM_ID, "Favorites", "", self.favorite_tracks())
    }

    /// History pseudo-album (most recent first)
    pub fn history_album(&self) -> Album {
        Album::new(
            HISTORY_ALBUM_ID,
            "Recently Played",
            "",
            self.history.recent_first(),
        )
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ===== Volume =====

    /// Set volume, clamped to [0, 1], on both sinks
    pub fn set_volume(&mut self, level: f32) {
        if self.volume.set_level(level) {
            self.volume_changed();
        }
    }

    pub fn volume_up(&mut self) {
        self.volume.step_up(self.config.volume_step);
        self.volume_changed();
    }

    pub fn volume_down(&mut self) {
        self.volume.step_down(self.config.volume_step);
        self.volume_changed();
    }

    /// Mute, or restore the level from before muting
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.volume_changed();
    }

    pub fn volume(&self) -> f32 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    fn volume_changed(&mut self) {
        self.apply_volume();
        let level = self.volume.level();
        if let Err(e) = self.store.save_volume(level) {
            warn!("Failed to save volume: {}", e);
        }
        self.emit(PlaybackEvent::VolumeChanged {
            level,
            muted: self.volume.is_muted(),
        });
    }

    fn apply_volume(&mut self) {
        let level = self.volume.level();
        self.audio.set_volume(level);
        self.video.set_volume(level);
    }

    // ===== Sleep Timer =====

    /// Pause playback once `after` has elapsed from `now`
    pub fn set_sleep_timer(&mut self, after: Duration, now: Instant) {
        info!("Sleep timer set for {} minutes", after.as_secs() / 60);
        self.sleep_timer.arm(after, now);
    }

    pub fn cancel_sleep_timer(&mut self) {
        self.sleep_timer.cancel();
    }

    pub fn sleep_timer_remaining(&self, now: Instant) -> Option<Duration> {
        self.sleep_timer.remaining(now)
    }

    /// Check the sleep timer; returns `true` if it fired and paused playback
    pub fn poll_sleep_timer(&mut self, now: Instant) -> bool {
        if !self.sleep_timer.fire_if_due(now) {
            return false;
        }

        self.audio.pause();
        self.video.pause();
        if self.current_index.is_some() {
            self.set_status(PlaybackStatus::Paused);
            self.persist_snapshot();
        }
        info!("Sleep timer expired, playback paused");
        self.emit(PlaybackEvent::SleepTimerExpired);
        true
    }

    // ===== State Queries =====

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Sink currently driving playback
    pub fn active_sink_kind(&self) -> SinkKind {
        self.sink_kind
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.active.get(i))
    }

    /// Playlist being traversed (possibly shuffled)
    pub fn active_playlist(&self) -> &[Track] {
        &self.active
    }

    /// Unshuffled order
    pub fn base_playlist(&self) -> &[Track] {
        &self.base
    }

    /// Elapsed time of the current track
    pub fn position(&self) -> Duration {
        if self.current_index.is_none() {
            return Duration::ZERO;
        }
        self.sink(self.sink_kind).position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.current_index?;
        self.sink(self.sink_kind).duration()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Persistence =====

    /// Save the resume snapshot (best-effort)
    pub fn persist_snapshot(&self) {
        let (Some(index), Some(track)) = (self.current_index, self.current_track()) else {
            return;
        };

        let snapshot = PlaybackSnapshot {
            track: track.clone(),
            time: self.position().as_secs_f64(),
            playlist: self.active.clone(),
            index,
        };

        if let Err(e) = self.store.save_snapshot(&snapshot) {
            warn!("Failed to save playback snapshot: {}", e);
        }
    }

    fn persist_history(&self) {
        if let Err(e) = self.store.save_history(&self.history.to_vec()) {
            warn!("Failed to save history: {}", e);
        }
    }

    // ===== Internal =====

    /// Make `active[index]` current and start it on the right sink
    fn start_current(&mut self, index: usize) -> Result<()> {
        let previous_track_id = self.current_track().map(|t| t.id.clone());
        let track = self.active[index].clone();
        let kind = SinkKind::for_track(&track);

        self.current_index = Some(index);
        self.sink_mut(kind.other()).pause();
        self.sink_kind = kind;
        self.last_snapshot_bucket = Some(0);
        self.preload_announced = None;

        debug!("Playing '{}' on {} sink", track.title, kind);
        self.emit(PlaybackEvent::TrackChanged {
            track_id: track.id.clone(),
            previous_track_id,
            sink: kind,
        });

        if self.history.push(track.clone()) {
            self.persist_history();
        }

        let level = self.volume.level();
        let sink = self.sink_mut(kind);
        sink.set_volume(level);
        let started = sink.load(&track.src).and_then(|()| sink.play());

        let result = match started {
            Ok(()) => {
                self.set_status(PlaybackStatus::Playing);
                Ok(())
            }
            Err(e) => Err(self.report_media_error(kind, e)),
        };

        self.persist_snapshot();
        result
    }

    fn report_media_error(&mut self, kind: SinkKind, err: PlaybackError) -> PlaybackError {
        let title = self
            .current_track()
            .map(|t| t.title.clone())
            .unwrap_or_default();
        error!("Playback of '{}' failed: {}", title, err);

        self.set_status(PlaybackStatus::Paused);
        self.emit(PlaybackEvent::Error {
            sink: kind,
            message: err.to_string(),
        });
        err
    }

    fn snapshot_bucket(&self, position: Duration) -> u64 {
        position.as_secs() / self.config.snapshot_interval_secs.max(1)
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            self.status = status;
            self.emit(PlaybackEvent::StateChanged { status });
        }
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }

    fn sink(&self, kind: SinkKind) -> &dyn MediaSink {
        match kind {
            SinkKind::Audio => self.audio.as_ref(),
            SinkKind::Video => self.video.as_ref(),
        }
    }

    fn sink_mut(&mut self, kind: SinkKind) -> &mut dyn MediaSink {
        match kind {
            SinkKind::Audio => self.audio.as_mut(),
            SinkKind::Video => self.video.as_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amorlist_core::MemorySessionStore;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct SinkState {
        loaded: Option<String>,
        playing: bool,
        position: Duration,
        duration: Option<Duration>,
        volume: f32,
        fail_play: bool,
    }

    #[derive(Clone, Default)]
    struct MockSink(Arc<Mutex<SinkState>>);

    impl MockSink {
        fn state(&self) -> std::sync::MutexGuard<'_, SinkState> {
            self.0.lock().unwrap()
        }
    }

    impl MediaSink for MockSink {
        fn load(&mut self, uri: &str) -> Result<()> {
            let mut s = self.state();
            s.loaded = Some(uri.to_string());
            s.playing = false;
            s.position = Duration::ZERO;
            Ok(())
        }

        fn play(&mut self) -> Result<()> {
            let mut s = self.state();
            if s.fail_play {
                return Err(PlaybackError::media(SinkKind::Audio, "autoplay refused"));
            }
            s.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.state().playing = false;
        }

        fn seek(&mut self, position: Duration) {
            self.state().position = position;
        }

        fn set_volume(&mut self, volume: f32) {
            self.state().volume = volume;
        }

        fn position(&self) -> Duration {
            self.state().position
        }

        fn duration(&self) -> Option<Duration> {
            self.state().duration
        }
    }

    struct Harness {
        engine: PlaybackEngine,
        audio: MockSink,
        video: MockSink,
        store: MemorySessionStore,
    }

    fn harness_with(store: MemorySessionStore) -> Harness {
        let audio = MockSink::default();
        let video = MockSink::default();
        let engine = PlaybackEngine::new(
            PlaybackConfig::default(),
            Box::new(audio.clone()),
            Box::new(video.clone()),
            Box::new(store.clone()),
        );
        Harness {
            engine,
            audio,
            video,
            store,
        }
    }

    fn harness() -> Harness {
        harness_with(MemorySessionStore::new())
    }

    fn create_test_track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Track {id}"),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            src: format!("/api/stream/{id}"),
            cover: String::new(),
            is_video: false,
        }
    }

    fn create_test_video(id: &str) -> Track {
        Track {
            is_video: true,
            ..create_test_track(id)
        }
    }

    fn tracks(ids: &[&str]) -> Vec<Track> {
        ids.iter().map(|id| create_test_track(id)).collect()
    }

    fn current_id(engine: &PlaybackEngine) -> Option<&str> {
        engine.current_track().map(|t| t.id.as_str())
    }

    fn active_ids(engine: &PlaybackEngine) -> Vec<&str> {
        engine.active_playlist().iter().map(|t| t.id.as_str()).collect()
    }

    // ===== Basic playback =====

    #[test]
    fn play_loads_and_starts_audio_sink() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b", "c"]), 1).unwrap();

        assert_eq!(current_id(&h.engine), Some("b"));
        assert_eq!(h.engine.status(), PlaybackStatus::Playing);
        assert_eq!(h.engine.active_sink_kind(), SinkKind::Audio);
        assert_eq!(h.audio.state().loaded.as_deref(), Some("/api/stream/b"));
        assert!(h.audio.state().playing);
        assert_eq!(h.engine.base_playlist(), h.engine.active_playlist());
    }

    #[test]
    fn play_with_invalid_input_is_noop() {
        let mut h = harness();
        h.engine.play(Vec::new(), 0).unwrap();
        h.engine.play(tracks(&["a"]), 3).unwrap();

        assert_eq!(h.engine.current_index(), None);
        assert_eq!(h.engine.status(), PlaybackStatus::Stopped);
        assert!(h.engine.drain_events().is_empty());
    }

    #[test]
    fn navigation_without_playlist_is_noop() {
        let mut h = harness();
        h.engine.next().unwrap();
        h.engine.previous().unwrap();
        h.engine.toggle_play_pause().unwrap();
        h.engine.on_track_ended().unwrap();
        assert_eq!(h.engine.current_index(), None);
    }

    #[test]
    fn toggle_play_pause_flips_status() {
        let mut h = harness();
        h.engine.play(tracks(&["a"]), 0).unwrap();

        h.engine.toggle_play_pause().unwrap();
        assert_eq!(h.engine.status(), PlaybackStatus::Paused);
        assert!(!h.audio.state().playing);

        h.engine.toggle_play_pause().unwrap();
        assert_eq!(h.engine.status(), PlaybackStatus::Playing);
        assert!(h.audio.state().playing);
    }

    #[test]
    fn next_and_previous_wrap_around() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b", "c"]), 2).unwrap();

        h.engine.next().unwrap();
        assert_eq!(current_id(&h.engine), Some("a"));

        h.engine.previous().unwrap();
        assert_eq!(current_id(&h.engine), Some("c"));
    }

    #[test]
    fn previous_restarts_after_threshold() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b", "c"]), 1).unwrap();
        h.audio.state().position = Duration::from_secs(5);

        h.engine.previous().unwrap();
        assert_eq!(current_id(&h.engine), Some("b"));
        assert_eq!(h.audio.state().position, Duration::ZERO);
    }

    #[test]
    fn previous_at_threshold_changes_track() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b", "c"]), 1).unwrap();
        h.audio.state().position = Duration::from_secs(3);

        h.engine.previous().unwrap();
        assert_eq!(current_id(&h.engine), Some("a"));
    }

    // ===== Queue =====

    #[test]
    fn duplicate_enqueue_is_rejected() {
        let mut h = harness();
        h.engine.enqueue(create_test_track("q")).unwrap();
        let err = h.engine.enqueue(create_test_track("q")).unwrap_err();

        assert!(err.is_warning());
        assert_eq!(h.engine.queue().len(), 1);
    }

    #[test]
    fn play_from_queue_abandons_playlist() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b"]), 0).unwrap();
        h.engine.enqueue(create_test_track("x")).unwrap();
        h.engine.enqueue(create_test_track("y")).unwrap();

        h.engine.play_from_queue(1).unwrap();
        assert_eq!(active_ids(&h.engine), vec!["y"]);
        assert_eq!(h.engine.queue().len(), 1);
        assert_eq!(h.engine.queue().peek().map(|t| t.id.as_str()), Some("x"));
    }

    #[test]
    fn dequeue_out_of_range_returns_none() {
        let mut h = harness();
        h.engine.enqueue(create_test_track("x")).unwrap();
        assert!(h.engine.dequeue_at(4).is_none());
        assert_eq!(h.engine.dequeue_at(0).map(|t| t.id), Some("x".to_string()));
    }

    // ===== Shuffle & Repeat =====

    #[test]
    fn shuffle_on_empty_playlist_only_flips_flag() {
        let mut h = harness();
        assert!(h.engine.toggle_shuffle());
        assert!(h.engine.active_playlist().is_empty());
        assert!(!h.engine.toggle_shuffle());
    }

    #[test]
    fn shuffle_round_trip_keeps_current_track() {
        let mut h = harness();
        h.engine.reseed_shuffle(7);
        let songs = tracks(&["a", "b", "c", "d", "e", "f"]);
        h.engine.play(songs.clone(), 3).unwrap();

        assert!(h.engine.toggle_shuffle());
        assert_eq!(h.engine.current_index(), Some(0));
        assert_eq!(current_id(&h.engine), Some("d"));
        assert_eq!(h.engine.active_playlist().len(), 6);

        h.engine.next().unwrap();
        let after_next = current_id(&h.engine).map(str::to_string);

        assert!(!h.engine.toggle_shuffle());
        assert_eq!(h.engine.active_playlist(), songs.as_slice());
        assert_eq!(current_id(&h.engine), after_next.as_deref());
    }

    #[test]
    fn shuffled_play_all_restores_album_order() {
        let mut h = harness();
        h.engine.reseed_shuffle(42);
        let songs = tracks(&["a", "b", "c", "d"]);

        h.engine.play_all(songs.clone(), true).unwrap();
        assert!(h.engine.shuffle_enabled());
        assert_eq!(h.engine.base_playlist(), songs.as_slice());
        let playing = current_id(&h.engine).map(str::to_string);

        h.engine.toggle_shuffle();
        assert_eq!(h.engine.active_playlist(), songs.as_slice());
        assert_eq!(current_id(&h.engine), playing.as_deref());
    }

    #[test]
    fn repeat_one_replays_on_end_but_not_on_next() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b"]), 0).unwrap();
        h.engine.cycle_repeat_mode();
        assert_eq!(h.engine.cycle_repeat_mode(), RepeatMode::One);

        h.audio.state().position = Duration::from_secs(200);
        h.engine.on_track_ended().unwrap();
        assert_eq!(current_id(&h.engine), Some("a"));
        assert_eq!(h.audio.state().position, Duration::ZERO);
        assert!(h.audio.state().playing);

        h.engine.next().unwrap();
        assert_eq!(current_id(&h.engine), Some("b"));
    }

    #[test]
    fn repeat_off_still_wraps_on_end() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b"]), 1).unwrap();
        h.engine.on_track_ended().unwrap();
        assert_eq!(current_id(&h.engine), Some("a"));
    }

    // ===== Sinks =====

    #[test]
    fn switching_to_video_pauses_audio() {
        let mut h = harness();
        let list = vec![create_test_track("a"), create_test_video("v")];
        h.engine.play(list, 0).unwrap();

        h.engine.next().unwrap();
        assert_eq!(h.engine.active_sink_kind(), SinkKind::Video);
        assert!(h.video.state().playing);
        assert!(!h.audio.state().playing);
    }

    #[test]
    fn events_from_inactive_sink_are_ignored() {
        let mut h = harness();
        let list = vec![create_test_video("v"), create_test_track("a")];
        h.engine.play(list, 0).unwrap();

        h.engine
            .handle_sink_event(SinkKind::Audio, SinkEvent::Ended)
            .unwrap();
        assert_eq!(current_id(&h.engine), Some("v"));

        h.engine
            .handle_sink_event(SinkKind::Video, SinkEvent::Ended)
            .unwrap();
        assert_eq!(current_id(&h.engine), Some("a"));
    }

    #[test]
    fn media_failure_does_not_skip() {
        let mut h = harness();
        h.audio.state().fail_play = true;

        let err = h.engine.play(tracks(&["a", "b"]), 0).unwrap_err();
        assert!(matches!(err, PlaybackError::Media { .. }));
        assert_eq!(current_id(&h.engine), Some("a"));
        assert_eq!(h.engine.status(), PlaybackStatus::Paused);

        let events = h.engine.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, PlaybackEvent::Error { sink: SinkKind::Audio, .. })));
    }

    #[test]
    fn sink_error_event_pauses() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b"]), 0).unwrap();

        let result = h.engine.handle_sink_event(
            SinkKind::Audio,
            SinkEvent::Error {
                message: "decode error".to_string(),
            },
        );
        assert!(result.is_err());
        assert_eq!(current_id(&h.engine), Some("a"));
        assert_eq!(h.engine.status(), PlaybackStatus::Paused);
    }

    // ===== Time updates =====

    #[test]
    fn snapshots_are_throttled_by_interval() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b"]), 0).unwrap();
        let base = h.store.write_count();

        let update = |secs| SinkEvent::TimeUpdate {
            position: Duration::from_secs(secs),
            duration: Some(Duration::from_secs(300)),
        };

        h.engine.handle_sink_event(SinkKind::Audio, update(5)).unwrap();
        assert_eq!(h.store.write_count(), base);

        h.engine.handle_sink_event(SinkKind::Audio, update(10)).unwrap();
        assert_eq!(h.store.write_count(), base + 1);

        h.engine.handle_sink_event(SinkKind::Audio, update(14)).unwrap();
        h.engine.handle_sink_event(SinkKind::Audio, update(25)).unwrap();
        assert_eq!(h.store.write_count(), base + 2);
    }

    #[test]
    fn preload_is_announced_once_per_track() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b"]), 0).unwrap();
        h.engine.drain_events();

        for secs in [50, 85, 95] {
            h.engine
                .handle_sink_event(
                    SinkKind::Audio,
                    SinkEvent::TimeUpdate {
                        position: Duration::from_secs(secs),
                        duration: Some(Duration::from_secs(100)),
                    },
                )
                .unwrap();
        }

        let preloads: Vec<_> = h
            .engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, PlaybackEvent::PreloadNext { .. }))
            .collect();
        assert_eq!(
            preloads,
            vec![PlaybackEvent::PreloadNext {
                track_id: "b".to_string(),
                src: "/api/stream/b".to_string(),
            }]
        );
    }

    #[test]
    fn no_preload_for_last_or_video_track() {
        let mut h = harness();
        h.engine
            .play(vec![create_test_track("a"), create_test_video("v")], 0)
            .unwrap();
        h.engine
            .handle_sink_event(
                SinkKind::Audio,
                SinkEvent::TimeUpdate {
                    position: Duration::from_secs(90),
                    duration: Some(Duration::from_secs(100)),
                },
            )
            .unwrap();

        assert!(!h
            .engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, PlaybackEvent::PreloadNext { .. })));
    }

    // ===== Seek =====

    #[test]
    fn seek_is_clamped_to_duration() {
        let mut h = harness();
        h.engine.play(tracks(&["a"]), 0).unwrap();
        h.audio.state().duration = Some(Duration::from_secs(60));

        h.engine.seek(Duration::from_secs(90));
        assert_eq!(h.engine.position(), Duration::from_secs(60));

        h.engine.seek(Duration::from_secs(30));
        h.engine.seek_backward();
        assert_eq!(h.engine.position(), Duration::from_secs(20));

        h.engine.seek_relative(-100.0);
        assert_eq!(h.engine.position(), Duration::ZERO);
    }

    // ===== Favorites, history, volume =====

    #[test]
    fn favorites_follow_library_order() {
        let mut h = harness();
        h.engine.load_library(vec![
            Album::new("x", "X", "", tracks(&["a", "b"])),
            Album::new("y", "Y", "", tracks(&["c"])),
        ]);

        assert!(h.engine.toggle_favorite("c"));
        assert!(h.engine.toggle_favorite("a"));

        let album = h.engine.favorites_album();
        assert_eq!(album.id, FAVORITES_ALBUM_ID);
        let ids: Vec<_> = album.songs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(h.store.favorites(), vec!["c".to_string(), "a".to_string()]);

        assert!(!h.engine.toggle_favorite("c"));
        assert!(!h.engine.is_favorite("c"));
    }

    #[test]
    fn history_album_is_most_recent_first() {
        let mut h = harness();
        h.engine.play(tracks(&["a", "b", "c"]), 0).unwrap();
        h.engine.next().unwrap();
        h.engine.next().unwrap();

        let album = h.engine.history_album();
        let ids: Vec<_> = album.songs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(h.store.history().len(), 3);
    }

    #[test]
    fn volume_applies_to_both_sinks_and_persists() {
        let mut h = harness();
        h.engine.set_volume(0.4);

        assert_eq!(h.audio.state().volume, 0.4);
        assert_eq!(h.video.state().volume, 0.4);
        assert_eq!(h.store.volume(), Some(0.4));

        h.engine.toggle_mute();
        assert!(h.engine.is_muted());
        h.engine.toggle_mute();
        assert_eq!(h.engine.volume(), 0.4);

        let reopened = harness_with(h.store.clone());
        assert_eq!(reopened.engine.volume(), 0.4);
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let mut h = harness();
        h.store.set_fail_writes(true);

        h.engine.play(tracks(&["a", "b"]), 0).unwrap();
        assert!(h.engine.toggle_favorite("a"));
        h.engine.set_volume(0.2);
        h.engine.next().unwrap();

        assert_eq!(current_id(&h.engine), Some("b"));
        assert!(h.store.snapshot().is_none());
    }

    // ===== Session restore =====

    #[test]
    fn restores_snapshot_paused_at_saved_position() {
        let store = MemorySessionStore::new();
        store
            .save_snapshot(&PlaybackSnapshot {
                track: create_test_track("b"),
                time: 42.0,
                playlist: tracks(&["a", "b", "c"]),
                index: 1,
            })
            .unwrap();

        let mut h = harness_with(store);
        assert_eq!(current_id(&h.engine), Some("b"));
        assert_eq!(h.engine.status(), PlaybackStatus::Paused);
        assert_eq!(h.audio.state().loaded.as_deref(), Some("/api/stream/b"));
        assert_eq!(h.engine.position(), Duration::from_secs(42));
        assert!(!h.audio.state().playing);

        h.engine.next().unwrap();
        assert_eq!(current_id(&h.engine), Some("c"));
    }

    #[test]
    fn restore_with_empty_playlist_uses_saved_track() {
        let store = MemorySessionStore::new();
        store
            .save_snapshot(&PlaybackSnapshot {
                track: create_test_video("v"),
                time: 3.0,
                playlist: Vec::new(),
                index: 0,
            })
            .unwrap();

        let h = harness_with(store);
        assert_eq!(active_ids(&h.engine), vec!["v"]);
        assert_eq!(h.engine.active_sink_kind(), SinkKind::Video);
        assert_eq!(h.video.state().loaded.as_deref(), Some("/api/stream/v"));
    }

    // ===== Sleep timer =====

    #[test]
    fn sleep_timer_pauses_playback() {
        let mut h = harness();
        h.engine.play(tracks(&["a"]), 0).unwrap();
        let start = Instant::now();
        h.engine.set_sleep_timer(Duration::from_secs(30 * 60), start);

        assert!(!h.engine.poll_sleep_timer(start + Duration::from_secs(29 * 60)));
        assert!(h.engine.poll_sleep_timer(start + Duration::from_secs(30 * 60)));

        assert_eq!(h.engine.status(), PlaybackStatus::Paused);
        assert!(!h.audio.state().playing);
        assert!(h
            .engine
            .drain_events()
            .contains(&PlaybackEvent::SleepTimerExpired));
        assert_eq!(h.engine.sleep_timer_remaining(start), None);
    }
}

//! Interactive playback session
//!
//! Reads one command per line from stdin, drives the engine, and prints the
//! events it emits. Headless sinks stand in for real media elements; `tick`
//! moves their clock forward.

use crate::commands::describe_track;
use crate::config::AppConfig;
use crate::sink::{headless, HeadlessClock};
use amorlist_core::{PlaylistStore, StatsProvider};
use amorlist_playback::{PlaybackEngine, PlaybackError, PlaybackEvent, SinkKind};
use amorlist_storage::JsonStorage;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Longest `tick` accepted in one command
const MAX_TICK_SECS: u64 = 24 * 60 * 60;

const HELP: &str = "\
commands:
  play <album#> [track#]     play an album from the library
  shuffleall <album#>        play an album in random order
  playlist <id> [track#]     play a custom playlist
  favorites | history        play liked / recently played tracks
  next | prev | pause        transport
  shuffle | repeat           toggle shuffle, cycle repeat mode
  queue                      show the play queue
  queue add <album#> <track#> | rm <n> | clear | play <n>
  like                       toggle favorite on the current track
  vol <0..1> | up | down | mute
  seek <secs> | seek +<secs> | seek -<secs>
  tick <secs>                let playback run for a while
  end                        simulate the current track ending
  sleep <minutes> | off      sleep timer
  status | help | quit";

/// Clock handles for both headless sinks
#[derive(Clone)]
pub struct Clocks {
    audio: HeadlessClock,
    video: HeadlessClock,
}

impl Clocks {
    fn get(&self, kind: SinkKind) -> &HeadlessClock {
        match kind {
            SinkKind::Audio => &self.audio,
            SinkKind::Video => &self.video,
        }
    }
}

/// Engine wired to headless sinks and the JSON session store
pub fn build_engine(
    config: &AppConfig,
    storage: &JsonStorage,
) -> anyhow::Result<(PlaybackEngine, Clocks)> {
    let (audio, audio_clock) = headless(SinkKind::Audio);
    let (video, video_clock) = headless(SinkKind::Video);
    let engine = PlaybackEngine::new(
        config.playback.clone(),
        Box::new(audio),
        Box::new(video),
        Box::new(storage.session()?),
    );
    Ok((
        engine,
        Clocks {
            audio: audio_clock,
            video: video_clock,
        },
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub enum VolumeCommand {
    Set(f32),
    Up,
    Down,
    Mute,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeekCommand {
    To(f64),
    By(f64),
}

/// A parsed session line; album/track/queue numbers are 0-based here
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Play { album: usize, track: usize },
    ShuffleAll { album: usize },
    Playlist { id: String, track: usize },
    Favorites,
    History,
    Next,
    Prev,
    Pause,
    Shuffle,
    Repeat,
    Queue,
    QueueAdd { album: usize, track: usize },
    QueueRemove(usize),
    QueueClear,
    QueuePlay(usize),
    Like,
    Volume(VolumeCommand),
    Seek(SeekCommand),
    Tick(u64),
    End,
    Sleep(Option<u64>),
    Status,
    Help,
    Quit,
}

/// Parse one input line; `Ok(None)` for a blank line
pub fn parse(line: &str) -> Result<Option<SessionCommand>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, args)) = words.split_first() else {
        return Ok(None);
    };

    let cmd = match (command, args) {
        ("play", [album]) => SessionCommand::Play {
            album: number(album)?,
            track: 0,
        },
        ("play", [album, track]) => SessionCommand::Play {
            album: number(album)?,
            track: number(track)?,
        },
        ("shuffleall", [album]) => SessionCommand::ShuffleAll {
            album: number(album)?,
        },
        ("playlist", [id]) => SessionCommand::Playlist {
            id: (*id).to_string(),
            track: 0,
        },
        ("playlist", [id, track]) => SessionCommand::Playlist {
            id: (*id).to_string(),
            track: number(track)?,
        },
        ("favorites", []) => SessionCommand::Favorites,
        ("history", []) => SessionCommand::History,
        ("next", []) => SessionCommand::Next,
        ("prev", []) => SessionCommand::Prev,
        ("pause", []) => SessionCommand::Pause,
        ("shuffle", []) => SessionCommand::Shuffle,
        ("repeat", []) => SessionCommand::Repeat,
        ("queue", []) => SessionCommand::Queue,
        ("queue", ["add", album, track]) => SessionCommand::QueueAdd {
            album: number(album)?,
            track: number(track)?,
        },
        ("queue", ["rm", n]) => SessionCommand::QueueRemove(number(n)?),
        ("queue", ["clear"]) => SessionCommand::QueueClear,
        ("queue", ["play", n]) => SessionCommand::QueuePlay(number(n)?),
        ("like", []) => SessionCommand::Like,
        ("vol", ["up"]) => SessionCommand::Volume(VolumeCommand::Up),
        ("vol", ["down"]) => SessionCommand::Volume(VolumeCommand::Down),
        ("vol", ["mute"]) => SessionCommand::Volume(VolumeCommand::Mute),
        ("vol", [level]) => {
            let level: f32 = level
                .parse()
                .map_err(|_| format!("not a volume: {level}"))?;
            SessionCommand::Volume(VolumeCommand::Set(level))
        }
        ("seek", [arg]) => SessionCommand::Seek(seek_arg(arg)?),
        ("tick", [secs]) => {
            let secs: u64 = secs.parse().map_err(|_| format!("not seconds: {secs}"))?;
            SessionCommand::Tick(secs.min(MAX_TICK_SECS))
        }
        ("end", []) => SessionCommand::End,
        ("sleep", ["off"]) => SessionCommand::Sleep(None),
        ("sleep", [minutes]) => {
            let minutes: u64 = minutes
                .parse()
                .map_err(|_| format!("not minutes: {minutes}"))?;
            SessionCommand::Sleep(Some(minutes))
        }
        ("status", []) => SessionCommand::Status,
        ("help", []) => SessionCommand::Help,
        ("quit" | "exit", []) => SessionCommand::Quit,
        _ => return Err(format!("unknown command: {}", line.trim())),
    };
    Ok(Some(cmd))
}

/// 1-based user number to 0-based index
fn number(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("expected a number from 1, got {arg}")),
    }
}

fn seek_arg(arg: &str) -> Result<SeekCommand, String> {
    let parse = |s: &str| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| format!("not seconds: {arg}"))
    };

    if let Some(rest) = arg.strip_prefix('+') {
        Ok(SeekCommand::By(parse(rest)?))
    } else if let Some(rest) = arg.strip_prefix('-') {
        Ok(SeekCommand::By(-parse(rest)?))
    } else {
        Ok(SeekCommand::To(parse(arg)?))
    }
}

pub struct Session<'a> {
    engine: PlaybackEngine,
    clocks: Clocks,
    storage: &'a JsonStorage,
}

impl<'a> Session<'a> {
    pub fn new(engine: PlaybackEngine, clocks: Clocks, storage: &'a JsonStorage) -> Self {
        Self {
            engine,
            clocks,
            storage,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        println!("{HELP}");
        // Restored session, if any
        self.flush_events().await;
        if self.engine.current_track().is_some() {
            self.print_status();
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            // An armed sleep timer must fire even while the prompt sits idle
            let next = match self.engine.sleep_timer_remaining(Instant::now()) {
                Some(left) => tokio::select! {
                    line = lines.next_line() => Some(line?),
                    () = tokio::time::sleep(left) => None,
                },
                None => Some(lines.next_line().await?),
            };
            let Some(line) = next else {
                println!();
                self.engine.poll_sleep_timer(Instant::now());
                self.flush_events().await;
                continue;
            };
            let Some(line) = line else {
                break;
            };

            match parse(&line) {
                Ok(None) => continue,
                Ok(Some(SessionCommand::Quit)) => break,
                Ok(Some(cmd)) => {
                    if let Err(e) = self.execute(cmd).await {
                        println!("! {e}");
                    }
                }
                Err(msg) => println!("? {msg}"),
            }

            self.engine.poll_sleep_timer(Instant::now());
            self.flush_events().await;
        }

        self.engine.persist_snapshot();
        Ok(())
    }

    async fn execute(&mut self, cmd: SessionCommand) -> anyhow::Result<()> {
        debug!("Session command: {:?}", cmd);
        match cmd {
            SessionCommand::Play { album, track } => {
                let album_id = self.album_id(album)?;
                self.engine.play_album(&album_id, track)?;
            }
            SessionCommand::ShuffleAll { album } => {
                let songs = self.album_songs(album)?;
                self.engine.play_all(songs, true)?;
            }
            SessionCommand::Playlist { id, track } => {
                let playlist = self
                    .storage
                    .playlists()
                    .get(&id)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("no playlist {id}"))?;
                self.engine.play_playlist(&playlist, track)?;
            }
            SessionCommand::Favorites => {
                let songs = self.engine.favorite_tracks();
                self.engine.play_all(songs, false)?;
            }
            SessionCommand::History => self.engine.play_history()?,
            SessionCommand::Next => self.engine.next()?,
            SessionCommand::Prev => self.engine.previous()?,
            SessionCommand::Pause => self.engine.toggle_play_pause()?,
            SessionCommand::Shuffle => {
                self.engine.toggle_shuffle();
            }
            SessionCommand::Repeat => {
                self.engine.cycle_repeat_mode();
            }
            SessionCommand::Queue => self.print_queue(),
            SessionCommand::QueueAdd { album, track } => {
                let songs = self.album_songs(album)?;
                let track = songs
                    .into_iter()
                    .nth(track)
                    .ok_or_else(|| anyhow::anyhow!("no such track"))?;
                match self.engine.enqueue(track) {
                    Err(PlaybackError::DuplicateInQueue(_)) => println!("already queued"),
                    other => other?,
                }
            }
            SessionCommand::QueueRemove(position) => {
                if self.engine.dequeue_at(position).is_none() {
                    println!("queue has no entry {}", position + 1);
                }
            }
            SessionCommand::QueueClear => self.engine.clear_queue(),
            SessionCommand::QueuePlay(position) => self.engine.play_from_queue(position)?,
            SessionCommand::Like => {
                if self.engine.toggle_favorite_current().is_none() {
                    println!("nothing playing");
                }
            }
            SessionCommand::Volume(VolumeCommand::Set(level)) => self.engine.set_volume(level),
            SessionCommand::Volume(VolumeCommand::Up) => self.engine.volume_up(),
            SessionCommand::Volume(VolumeCommand::Down) => self.engine.volume_down(),
            SessionCommand::Volume(VolumeCommand::Mute) => self.engine.toggle_mute(),
            SessionCommand::Seek(SeekCommand::To(secs)) => {
                self.engine
                    .seek(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO));
            }
            SessionCommand::Seek(SeekCommand::By(delta)) => self.engine.seek_relative(delta),
            SessionCommand::Tick(secs) => self.tick(secs)?,
            SessionCommand::End => {
                let kind = self.engine.active_sink_kind();
                self.engine
                    .handle_sink_event(kind, amorlist_playback::SinkEvent::Ended)?;
            }
            SessionCommand::Sleep(Some(minutes)) => {
                self.engine
                    .set_sleep_timer(Duration::from_secs(minutes * 60), Instant::now());
                println!("sleeping in {minutes} min");
            }
            SessionCommand::Sleep(None) => {
                self.engine.cancel_sleep_timer();
                println!("sleep timer off");
            }
            SessionCommand::Status => self.print_status(),
            SessionCommand::Help => println!("{HELP}"),
            SessionCommand::Quit => {}
        }
        Ok(())
    }

    /// Run the active sink's clock one second at a time, following track
    /// changes as the engine makes them. Stops early once the sleep timer
    /// has paused playback.
    fn tick(&mut self, secs: u64) -> anyhow::Result<()> {
        for _ in 0..secs {
            if self.engine.poll_sleep_timer(Instant::now()) {
                break;
            }
            let kind = self.engine.active_sink_kind();
            let clock = self.clocks.get(kind).clone();
            if !clock.is_playing() {
                break;
            }
            for event in clock.advance(Duration::from_secs(1)) {
                self.engine.handle_sink_event(kind, event)?;
            }
        }
        Ok(())
    }

    fn album_id(&self, album: usize) -> anyhow::Result<String> {
        self.engine
            .library()
            .get(album)
            .map(|a| a.id.clone())
            .ok_or_else(|| anyhow::anyhow!("no album {}", album + 1))
    }

    fn album_songs(&self, album: usize) -> anyhow::Result<Vec<amorlist_core::Track>> {
        self.engine
            .library()
            .get(album)
            .map(|a| a.songs.clone())
            .ok_or_else(|| anyhow::anyhow!("no album {}", album + 1))
    }

    /// Print pending events and report track starts to the stats store
    async fn flush_events(&mut self) {
        for event in self.engine.drain_events() {
            match &event {
                PlaybackEvent::TrackChanged { track_id, .. } => {
                    if let Some(track) = self.engine.current_track().filter(|t| &t.id == track_id)
                    {
                        println!("now playing: {}", describe_track(track));
                    }
                    if let Err(e) = self.storage.stats().record_play(track_id).await {
                        warn!("Failed to record play of {}: {}", track_id, e);
                    }
                }
                PlaybackEvent::StateChanged { status } => println!("{status:?}"),
                PlaybackEvent::QueueChanged { length } => println!("queue: {length} tracks"),
                PlaybackEvent::ShuffleChanged { enabled } => {
                    println!("shuffle {}", if *enabled { "on" } else { "off" });
                }
                PlaybackEvent::RepeatChanged { mode } => println!("repeat {mode}"),
                PlaybackEvent::VolumeChanged { level, muted } => {
                    if *muted {
                        println!("volume muted");
                    } else {
                        println!("volume {:.0}%", level * 100.0);
                    }
                }
                PlaybackEvent::FavoriteChanged { favorite, .. } => {
                    println!("{}", if *favorite { "liked" } else { "unliked" });
                }
                PlaybackEvent::SleepTimerExpired => println!("sleep timer expired"),
                PlaybackEvent::Error { sink, message } => println!("! {sink}: {message}"),
                PlaybackEvent::PreloadNext { track_id, .. } => {
                    debug!("Would preload {}", track_id);
                }
                PlaybackEvent::Position { .. } => {}
            }
        }
    }

    fn print_queue(&self) {
        let queue = self.engine.queue();
        if queue.is_empty() {
            println!("queue is empty");
        }
        for (i, track) in queue.iter().enumerate() {
            println!("{:>3}. {}", i + 1, describe_track(track));
        }
    }

    fn print_status(&self) {
        let engine = &self.engine;
        match engine.current_track() {
            Some(track) => println!(
                "{:?}: {} [{}/{}] {}s / {}s",
                engine.status(),
                describe_track(track),
                engine.current_index().map_or(0, |i| i + 1),
                engine.active_playlist().len(),
                engine.position().as_secs(),
                engine.duration().map_or(0, |d| d.as_secs()),
            ),
            None => println!("nothing loaded"),
        }

        let volume = if engine.is_muted() {
            "muted".to_string()
        } else {
            format!("{:.0}%", engine.volume() * 100.0)
        };
        println!(
            "shuffle {} | repeat {} | volume {} | queue {} | sink {}",
            if engine.shuffle_enabled() { "on" } else { "off" },
            engine.repeat_mode(),
            volume,
            engine.queue().len(),
            engine.active_sink_kind(),
        );

        if let Some(left) = engine.sleep_timer_remaining(Instant::now()) {
            println!("sleep in {}s", left.as_secs());
        }
    }
}

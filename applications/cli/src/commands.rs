//! One-shot subcommands

use crate::config::AppConfig;
use crate::session::{self, Session};
use crate::PlaylistAction;
use amorlist_core::{
    CreatePlaylist, LibraryProvider, PlaylistPatch, PlaylistStore, StatsProvider, Track,
};
use amorlist_storage::JsonStorage;

pub async fn library(storage: &JsonStorage, rescan: bool) -> anyhow::Result<()> {
    let albums = if rescan {
        storage.library().force_rescan().await?
    } else {
        storage.library().fetch_albums().await?
    };

    if albums.is_empty() {
        println!(
            "Library is empty (no {} in {})",
            amorlist_storage::library::LIBRARY_FILE,
            storage.dir().display()
        );
        return Ok(());
    }

    for (i, album) in albums.iter().enumerate() {
        let kind = if album.is_video_album() { " [video]" } else { "" };
        println!("{:>3}. {} ({} tracks){}", i + 1, album.name, album.songs.len(), kind);
    }
    Ok(())
}

pub async fn playlists(storage: &JsonStorage, action: PlaylistAction) -> anyhow::Result<()> {
    let store = storage.playlists();
    match action {
        PlaylistAction::List => {
            let playlists = store.list().await?;
            if playlists.is_empty() {
                println!("No playlists");
            }
            for playlist in playlists {
                println!(
                    "{}  {} ({} tracks, updated {})",
                    playlist.id,
                    playlist.name,
                    playlist.songs.len(),
                    playlist.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        PlaylistAction::Create { name } => {
            let playlist = store.create(CreatePlaylist::named(name)).await?;
            println!("Created {} '{}'", playlist.id, playlist.name);
        }
        PlaylistAction::Rename { id, name } => {
            let playlist = store.update(&id, PlaylistPatch::rename(name)).await?;
            println!("Renamed {} to '{}'", playlist.id, playlist.name);
        }
        PlaylistAction::Delete { id } => {
            let playlist = store.delete(&id).await?;
            println!("Deleted {} '{}'", playlist.id, playlist.name);
        }
    }
    Ok(())
}

pub async fn top(storage: &JsonStorage) -> anyhow::Result<()> {
    let top = storage.stats().top_played().await?;
    if top.is_empty() {
        println!("Nothing played yet");
    }
    for (i, entry) in top.iter().enumerate() {
        println!(
            "{:>3}. {} ({} plays)",
            i + 1,
            describe_track(&entry.track),
            entry.play_count
        );
    }
    Ok(())
}

pub async fn favorites(config: &AppConfig, storage: &JsonStorage) -> anyhow::Result<()> {
    let albums = storage.library().fetch_albums().await?;
    let (mut engine, _) = session::build_engine(config, storage)?;
    engine.load_library(albums);
    print_tracks(&engine.favorites_album().songs, "No favorites yet");
    Ok(())
}

pub fn history(config: &AppConfig, storage: &JsonStorage) -> anyhow::Result<()> {
    let (engine, _) = session::build_engine(config, storage)?;
    print_tracks(&engine.history_album().songs, "No history yet");
    Ok(())
}

pub async fn interactive(config: &AppConfig, storage: &JsonStorage) -> anyhow::Result<()> {
    let albums = storage.library().fetch_albums().await?;
    let (mut engine, clocks) = session::build_engine(config, storage)?;
    engine.load_library(albums);
    Session::new(engine, clocks, storage).run().await
}

pub fn describe_track(track: &Track) -> String {
    if track.artist.is_empty() {
        track.title.clone()
    } else {
        format!("{} - {}", track.artist, track.title)
    }
}

fn print_tracks(tracks: &[Track], empty: &str) {
    if tracks.is_empty() {
        println!("{empty}");
    }
    for (i, track) in tracks.iter().enumerate() {
        println!("{:>3}. {}", i + 1, describe_track(track));
    }
}

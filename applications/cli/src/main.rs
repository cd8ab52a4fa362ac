/// AmorList - headless music and video player
use amorlist_storage::JsonStorage;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod session;
mod sink;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "amorlist")]
#[command(about = "AmorList headless player", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./amorlist.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List albums in the library cache
    Library {
        /// Re-read the cache file from disk
        #[arg(long)]
        rescan: bool,
    },
    /// Manage custom playlists
    Playlists {
        #[command(subcommand)]
        action: PlaylistAction,
    },
    /// Show the most played tracks
    Top,
    /// Show liked tracks
    Favorites,
    /// Show recently played tracks
    History,
    /// Start an interactive playback session
    Session,
}

#[derive(Subcommand)]
pub enum PlaylistAction {
    /// List all playlists
    List,
    /// Create an empty playlist
    Create {
        /// Playlist name
        name: String,
    },
    /// Rename a playlist
    Rename {
        /// Playlist ID (pl_...)
        id: String,
        /// New name
        name: String,
    },
    /// Delete a playlist
    Delete {
        /// Playlist ID (pl_...)
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    // Initialize tracing (stderr keeps the session output clean)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let storage = JsonStorage::open(&config.storage.data_dir).await?;

    match cli.command {
        Commands::Library { rescan } => commands::library(&storage, rescan).await?,
        Commands::Playlists { action } => commands::playlists(&storage, action).await?,
        Commands::Top => commands::top(&storage).await?,
        Commands::Favorites => commands::favorites(&config, &storage).await?,
        Commands::History => commands::history(&config, &storage)?,
        Commands::Session => commands::interactive(&config, &storage).await?,
    }

    Ok(())
}

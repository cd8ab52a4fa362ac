/// Application configuration
use amorlist_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "amorlist.toml";

const DEFAULT_LOG_FILTER: &str = "amorlist=info,amorlist_playback=info,amorlist_storage=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                settings = settings
                    .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false));
            }
        }

        // Override with environment variables (AMORLIST_STORAGE__DATA_DIR, ...)
        settings = settings.add_source(
            config::Environment::with_prefix("AMORLIST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.data_dir cannot be empty".to_string(),
            ));
        }

        let playback = &self.playback;
        if playback.history_size == 0 {
            return Err(ConfigError::Invalid(
                "playback.history_size must be at least 1".to_string(),
            ));
        }

        if !playback.restart_threshold_secs.is_finite() || playback.restart_threshold_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "playback.restart_threshold_secs must be a non-negative number, got {}",
                playback.restart_threshold_secs
            )));
        }

        if playback.snapshot_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "playback.snapshot_interval_secs must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&playback.initial_volume) {
            return Err(ConfigError::Invalid(format!(
                "playback.initial_volume must be within [0, 1], got {}",
                playback.initial_volume
            )));
        }

        Ok(())
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

// Default values
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Host configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CadenceConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default = "default_logging")]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Keep track bytes so restored playlists stay playable
    #[serde(default = "default_blob_store")]
    pub blob_store: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_skip_delay_ms")]
    pub skip_delay_ms: u64,

    #[serde(default = "default_position_save_interval_ms")]
    pub position_save_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl CadenceConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `cadence.toml` in the working
    /// directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings =
                    settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from("cadence.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables, e.g. CADENCE_STORAGE__DATA_DIR
        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(CliError::Config(
                "storage.data_dir must not be empty (set CADENCE_STORAGE__DATA_DIR)".to_string(),
            ));
        }

        if self.playback.position_save_interval_ms == 0 {
            return Err(CliError::Config(
                "playback.position_save_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn position_save_interval(&self) -> Duration {
        Duration::from_millis(self.playback.position_save_interval_ms)
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            playback: default_playback(),
            logging: default_logging(),
        }
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        data_dir: default_data_dir(),
        blob_store: default_blob_store(),
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./cadence-data")
}

fn default_blob_store() -> bool {
    true
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        skip_delay_ms: default_skip_delay_ms(),
        position_save_interval_ms: default_position_save_interval_ms(),
    }
}

fn default_skip_delay_ms() -> u64 {
    1000
}

fn default_position_save_interval_ms() -> u64 {
    5000
}

fn default_logging() -> LoggingSettings {
    LoggingSettings {
        filter: default_log_filter(),
    }
}

fn default_log_filter() -> String {
    "cadence=info".to_string()
}

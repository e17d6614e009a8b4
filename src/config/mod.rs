//! Settings persisted in `config.toml` under the app root.

mod defaults;
mod io;

pub use io::{CONFIG_FILE_NAME, config_path, load_or_default, load_settings_from, save, save_to_path};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioOutputConfig;
use crate::gemini::GeminiSettings;

use defaults::{
    clamp_count, clamp_period, clamp_volume, default_deck_refresh_interval_secs,
    default_deck_size, default_prefetch_count, default_roulette_interval_secs, default_volume,
};

/// User settings.
///
/// Config keys (TOML): `volume`, `roulette_interval_secs`,
/// `deck_refresh_interval_secs`, `prefetch_count`, `deck_size`,
/// `audio_output`, `gemini`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_roulette_interval_secs")]
    pub roulette_interval_secs: u32,
    #[serde(default = "default_deck_refresh_interval_secs")]
    pub deck_refresh_interval_secs: u32,
    /// How many items of a fresh deck are synthesized ahead of time.
    #[serde(default = "default_prefetch_count")]
    pub prefetch_count: usize,
    /// Items requested from the deck generator.
    #[serde(default = "default_deck_size")]
    pub deck_size: usize,
    #[serde(default)]
    pub audio_output: AudioOutputConfig,
    #[serde(default)]
    pub gemini: GeminiSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            roulette_interval_secs: default_roulette_interval_secs(),
            deck_refresh_interval_secs: default_deck_refresh_interval_secs(),
            prefetch_count: default_prefetch_count(),
            deck_size: default_deck_size(),
            audio_output: AudioOutputConfig::default(),
            gemini: GeminiSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn normalized(mut self) -> Self {
        self.volume = clamp_volume(self.volume);
        self.roulette_interval_secs = clamp_period(self.roulette_interval_secs);
        self.deck_refresh_interval_secs = clamp_period(self.deck_refresh_interval_secs);
        self.deck_size = clamp_count(self.deck_size);
        self.prefetch_count = self.prefetch_count.min(self.deck_size);
        self.gemini = self.gemini.normalized();
        self
    }
}

/// Errors that can occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write the config file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize TOML config.
    #[error("Failed to serialize config {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
}

#[cfg(test)]
mod tests;

// Configuration management for backdrop
// Handles loading/saving settings, with sensible defaults when config is missing

use anyhow::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::preference::FilePreferenceStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub preference: PreferenceConfig,
    pub fade: FadeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceConfig {
    pub key: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    pub steps: u32,
    pub paused_fade_in_ms: u64, // seek while paused: play, then fade in
    pub fade_out_ms: u64,       // seek while playing: out, seek, in
    pub fade_in_ms: u64,
    pub target_volume: f64,
    pub supersede_in_flight: bool, // newer crossfade stops older ramps
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            key: "wallAudioPreference".to_string(),
            path: FilePreferenceStore::default_path(),
        }
    }
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            steps: 20,
            paused_fade_in_ms: 1000,
            fade_out_ms: 800,
            fade_in_ms: 800,
            target_volume: 1.0,
            supersede_in_flight: true,
        }
    }
}

impl FadeConfig {
    pub fn paused_fade_in(&self) -> Duration {
        Duration::from_millis(self.paused_fade_in_ms)
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load from an explicit path, writing defaults there if nothing exists yet
    pub fn load_from<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(Self::config_path()?)
    }

    pub fn save_to<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("backdrop");

        Ok(config_dir.join("config.toml"))
    }
}

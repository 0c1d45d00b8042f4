use crate::error::{Error, Result};
use crate::lock::LockOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Main configuration for instalock
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub assets: AssetSettings,
    #[serde(default)]
    pub matching: MatchSettings,
    #[serde(default)]
    pub timing: TimingSettings,
}

/// Where the resolution-keyed template directories live
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssetSettings {
    #[serde(default = "default_assets_dir")]
    pub dir: PathBuf,
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            dir: default_assets_dir(),
        }
    }
}

/// Template matching configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatchSettings {
    /// Minimum normalized cross-correlation for a match (0.0 to 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    0.8
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            confidence: default_confidence(),
        }
    }
}

/// Polling and input pacing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimingSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_input_pause_ms")]
    pub input_pause_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_input_pause_ms() -> u64 {
    10
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            input_pause_ms: default_input_pause_ms(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/instalock/config.toml")
    }

    /// Load config from the default path, returning defaults if it doesn't exist
    pub fn load() -> Self {
        Self::load_from(Self::path())
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring config file");
                Self::default()
            }
        }
    }

    /// Read and validate config from `path`
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::path())
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let confidence = self.matching.confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::Config(format!(
                "matching.confidence must be within 0.0..=1.0, got {}",
                confidence
            )));
        }
        Ok(())
    }

    /// Lock sequence timing and thresholds derived from this config
    pub fn lock_options(&self) -> LockOptions {
        LockOptions {
            confidence: self.matching.confidence,
            poll_interval: Duration::from_millis(self.timing.poll_interval_ms),
            input_pause: Duration::from_millis(self.timing.input_pause_ms),
        }
    }
}

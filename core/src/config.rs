//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for engine, history and
//! playback settings. Settings are stored in TOML format in the
//! platform-specific config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::ClickOrder;

/// Milliseconds per half-tick for each playback speed step, slowest first.
pub const PLAYBACK_SPEEDS_MS: [u64; 7] = [800, 400, 200, 100, 50, 25, 12];

/// Errors from reading or writing an explicit config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration.
///
/// Contains all user-configurable settings organized into sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Tick engine settings
    #[serde(default)]
    pub engine: EngineConfig,
    /// History manager settings
    #[serde(default)]
    pub history: HistoryConfig,
    /// Replay pacing settings
    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// Tick engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// When a pending click moves the protagonist (default: early)
    #[serde(default)]
    pub click_order: ClickOrder,
}

/// History manager configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Run-length compress recorded states on a worker thread (default: true)
    #[serde(default = "default_true")]
    pub compress: bool,
}

/// Replay pacing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Index into the speed table (default: 3, range: 0-6)
    #[serde(default = "default_speed")]
    pub speed: usize,
}

fn default_true() -> bool {
    true
}
fn default_speed() -> usize {
    3
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            compress: default_true(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
        }
    }
}

impl PlaybackConfig {
    /// Delay between half-ticks during replay. Out-of-range speeds clamp to
    /// the fastest step.
    pub fn half_tick_delay(&self) -> std::time::Duration {
        let index = self.speed.min(PLAYBACK_SPEEDS_MS.len() - 1);
        std::time::Duration::from_millis(PLAYBACK_SPEEDS_MS[index])
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Slipway\config`
/// On macOS: `~/Library/Application Support/io.slipway.Slipway`
/// On Linux: `~/.config/Slipway`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.slipway", "", "Slipway")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_dir()
        .and_then(|dir| load_from(&dir.join("config.toml")).ok())
        .unwrap_or_default()
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = config_dir() {
        save_to(config, &dir.join("config.toml"))?;
    }
    Ok(())
}

/// Loads a configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Saves a configuration to an explicit path, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================================
    // Default value tests
    // =============================================================

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.engine.click_order, ClickOrder::Early);
        assert!(config.history.compress);
        assert_eq!(config.playback.speed, 3);
    }

    #[test]
    fn test_half_tick_delay() {
        let mut playback = PlaybackConfig::default();
        assert_eq!(playback.half_tick_delay().as_millis(), 100);
        playback.speed = 0;
        assert_eq!(playback.half_tick_delay().as_millis(), 800);
        playback.speed = 40;
        assert_eq!(playback.half_tick_delay().as_millis(), 12);
    }

    // =============================================================
    // Serialization tests
    // =============================================================

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            click_order = "late"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.click_order, ClickOrder::Late);
        assert!(config.history.compress);
        assert_eq!(config.playback, PlaybackConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.history.compress = false;
        config.playback.speed = 6;
        save_to(&config, &path).unwrap();

        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(load_from(&missing), Err(ConfigError::Io(_))));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[engine\n").unwrap();
        assert!(matches!(load_from(&broken), Err(ConfigError::Parse(_))));
    }
}

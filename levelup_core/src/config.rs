//! Configuration file support for LevelUp.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/levelup/config.toml`.
//! Every section is optional; missing keys fall back to the defaults below.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub progression: ProgressionPolicy,

    #[serde(default)]
    pub timer: TimerSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Load progression heuristics
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressionPolicy {
    /// Fractional increase after an `easy` rating
    #[serde(default = "default_easy_increase_pct")]
    pub easy_increase_pct: f64,

    /// Smallest increase after an `easy` rating
    #[serde(default = "default_min_increment")]
    pub min_increment: f64,

    /// Fractional reduction after a `hard` rating
    #[serde(default = "default_hard_decrease_pct")]
    pub hard_decrease_pct: f64,

    /// Starting load when an exercise has no default-load table
    #[serde(default = "default_fallback_load")]
    pub fallback_load: f64,

    /// Plate granularity suggestions are rounded to
    #[serde(default = "default_rounding_step")]
    pub rounding_step: f64,
}

impl Default for ProgressionPolicy {
    fn default() -> Self {
        Self {
            easy_increase_pct: default_easy_increase_pct(),
            min_increment: default_min_increment(),
            hard_decrease_pct: default_hard_decrease_pct(),
            fallback_load: default_fallback_load(),
            rounding_step: default_rounding_step(),
        }
    }
}

/// Rest timer behaviour
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimerSettings {
    /// Play the audio cue on expiry
    #[serde(default = "default_true")]
    pub sound_enabled: bool,

    /// Haptic pattern in milliseconds (on, off, on, ...)
    #[serde(default = "default_vibration_pattern")]
    pub vibration_pattern: Vec<u32>,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Seconds added by the "+time" action
    #[serde(default = "default_extend_seconds")]
    pub extend_seconds: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            vibration_pattern: default_vibration_pattern(),
            tick_interval_ms: default_tick_interval_ms(),
            extend_seconds: default_extend_seconds(),
        }
    }
}

/// Active workout flow settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    /// Pause after an exercise completes before the next one is shown
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            advance_delay_ms: default_advance_delay_ms(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("levelup")
}

fn default_easy_increase_pct() -> f64 {
    0.05
}

fn default_min_increment() -> f64 {
    2.5
}

fn default_hard_decrease_pct() -> f64 {
    0.10
}

fn default_fallback_load() -> f64 {
    10.0
}

fn default_rounding_step() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

fn default_vibration_pattern() -> Vec<u32> {
    vec![200, 100, 200]
}

fn default_tick_interval_ms() -> u64 {
    200
}

fn default_extend_seconds() -> u32 {
    30
}

fn default_advance_delay_ms() -> u64 {
    100
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values that would break the suggestion engine or the timer
    pub fn validate(&self) -> Result<()> {
        let p = &self.progression;
        if !(p.rounding_step.is_finite() && p.rounding_step > 0.0) {
            return Err(Error::Config(format!(
                "progression.rounding_step must be positive, got {}",
                p.rounding_step
            )));
        }
        if !(0.0..1.0).contains(&p.hard_decrease_pct) {
            return Err(Error::Config(format!(
                "progression.hard_decrease_pct must be in [0, 1), got {}",
                p.hard_decrease_pct
            )));
        }
        if p.easy_increase_pct < 0.0 || p.min_increment < 0.0 || p.fallback_load < 0.0 {
            return Err(Error::Config(
                "progression values must not be negative".into(),
            ));
        }
        if self.timer.tick_interval_ms == 0 {
            return Err(Error::Config("timer.tick_interval_ms must be > 0".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("levelup")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.progression.min_increment, 2.5);
        assert_eq!(config.progression.fallback_load, 10.0);
        assert_eq!(config.timer.vibration_pattern, vec![200, 100, 200]);
        assert_eq!(config.timer.tick_interval_ms, 200);
        assert_eq!(config.session.advance_delay_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.progression, parsed.progression);
        assert_eq!(config.timer, parsed.timer);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[progression]
min_increment = 5.0

[timer]
sound_enabled = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.progression.min_increment, 5.0);
        assert_eq!(config.progression.easy_increase_pct, 0.05); // default
        assert!(!config.timer.sound_enabled);
        assert_eq!(config.timer.extend_seconds, 30); // default
    }

    #[test]
    fn test_load_from_rejects_bad_rounding_step() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[progression]\nrounding_step = 0.0\n").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.timer.extend_seconds = 15;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timer.extend_seconds, 15);
    }
}

//! TOML-based application configuration.
//!
//! Stores the CLI's timer defaults and cue/notification preferences.
//! Configuration is stored at `~/.config/intervalist/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::TimerConfig;

/// Preset used when timer flags are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerDefaults {
    #[serde(default)]
    pub work_minutes: u32,
    #[serde(default = "default_work_seconds")]
    pub work_seconds: u32,
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
}

/// Audio cue preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ring the terminal bell on each cue.
    #[serde(default = "default_true")]
    pub bell: bool,
}

/// System notification preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/intervalist/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: TimerDefaults,
    #[serde(default)]
    pub cues: CueConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_true() -> bool {
    true
}
fn default_work_seconds() -> u32 {
    30
}
fn default_rest_seconds() -> u32 {
    15
}
fn default_repetitions() -> u32 {
    8
}

impl Default for TimerDefaults {
    fn default() -> Self {
        Self {
            work_minutes: 0,
            work_seconds: default_work_seconds(),
            rest_seconds: default_rest_seconds(),
            repetitions: default_repetitions(),
        }
    }
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: true,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: TimerDefaults::default(),
            cues: CueConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default config on first use.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning the default on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as a string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "defaults.work_minutes" => self.defaults.work_minutes.to_string(),
            "defaults.work_seconds" => self.defaults.work_seconds.to_string(),
            "defaults.rest_seconds" => self.defaults.rest_seconds.to_string(),
            "defaults.repetitions" => self.defaults.repetitions.to_string(),
            "cues.enabled" => self.cues.enabled.to_string(),
            "cues.bell" => self.cues.bell.to_string(),
            "notifications.enabled" => self.notifications.enabled.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Apply a value by dot-separated key without persisting.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "defaults.work_minutes" => self.defaults.work_minutes = parse_u32(key, value)?,
            "defaults.work_seconds" => self.defaults.work_seconds = parse_u32(key, value)?,
            "defaults.rest_seconds" => self.defaults.rest_seconds = parse_u32(key, value)?,
            "defaults.repetitions" => self.defaults.repetitions = parse_u32(key, value)?,
            "cues.enabled" => self.cues.enabled = parse_bool(key, value)?,
            "cues.bell" => self.cues.bell = parse_bool(key, value)?,
            "notifications.enabled" => self.notifications.enabled = parse_bool(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Set a value by key and persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Timer configuration built from the configured defaults.
    pub fn timer_config(&self, name: impl Into<String>) -> TimerConfig {
        TimerConfig::new(
            name,
            self.defaults.work_minutes,
            self.defaults.work_seconds,
            self.defaults.rest_seconds,
            self.defaults.repetitions,
        )
    }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a non-negative integer, got '{value}'"),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected true or false, got '{value}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.defaults.work_seconds, 30);
        assert_eq!(parsed.defaults.repetitions, 8);
        assert!(parsed.cues.bell);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("defaults.work_seconds").as_deref(), Some("30"));
        assert_eq!(cfg.get("cues.enabled").as_deref(), Some("true"));
        assert!(cfg.get("cues.missing_key").is_none());
    }

    #[test]
    fn apply_updates_numbers_and_bools() {
        let mut cfg = Config::default();
        cfg.apply("defaults.rest_seconds", "45").unwrap();
        assert_eq!(cfg.defaults.rest_seconds, 45);
        cfg.apply("cues.bell", "false").unwrap();
        assert!(!cfg.cues.bell);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("defaults.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_value() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("defaults.repetitions", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.apply("cues.enabled", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn timer_config_uses_defaults() {
        let mut cfg = Config::default();
        cfg.apply("defaults.work_minutes", "1").unwrap();
        cfg.apply("defaults.work_seconds", "10").unwrap();
        let timer = cfg.timer_config("morning");
        assert_eq!(timer.name, "morning");
        assert_eq!(timer.work_secs, 70);
        assert_eq!(timer.repetitions, 8);
    }
}

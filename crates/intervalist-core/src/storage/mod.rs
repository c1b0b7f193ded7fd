mod config;

pub use config::{Config, CueConfig, NotificationsConfig, TimerDefaults};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/intervalist[-dev]/` based on INTERVALIST_ENV.
///
/// Set INTERVALIST_ENV=dev to use the development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("INTERVALIST_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("intervalist-dev")
    } else {
        base_dir.join("intervalist")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

//! Error types for intervalist-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::timer::TimerId;

/// Engine-level errors.
///
/// State-ineligible transitions (pausing an idle timer, starting a running
/// one) are deliberately not errors -- those calls return `Ok(None)` so the
/// caller can tell "not found" apart from "not eligible".
#[derive(Error, Debug)]
pub enum EngineError {
    /// The given id is not in the active timer set.
    #[error("no timer with id {0}")]
    TimerNotFound(TimerId),

    /// A holder of the timer registry lock panicked.
    #[error("timer registry lock poisoned")]
    RegistryPoisoned,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for engine operations.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

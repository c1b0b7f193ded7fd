//! # Intervalist Core Library
//!
//! Core business logic for Intervalist, a workout interval timer. The CLI
//! binary is a thin presentation layer over this crate; anything that can
//! tick, cue, or complete lives here.
//!
//! ## Architecture
//!
//! - **Timer state machine**: a tick-driven Prepare/Work/Rest countdown
//!   with no internal clock -- the owner calls `tick()` once per second
//! - **Engine**: async coordinator owning the active timers, one
//!   cancellable one-second tokio loop per running timer, with a
//!   watch-published snapshot stream
//! - **Cues**: capability traits for audio and system-notification side
//!   effects, dispatched synchronously at each transition
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`IntervalTimer`]: per-timer countdown state machine
//! - [`TimerEngine`]: active-timer coordinator
//! - [`CuePlayer`] / [`Notifier`]: side-effect collaborators
//! - [`Config`]: application configuration management

pub mod cues;
pub mod engine;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use cues::{CuePlayer, Notifier, NoopCues, NoopNotifier};
pub use engine::TimerEngine;
pub use error::{ConfigError, EngineError};
pub use events::{Event, Signal};
pub use storage::Config;
pub use timer::{IntervalTimer, Phase, TimerConfig, TimerId, TimerSnapshot, TimerState, PREPARE_SECS};

mod config;
mod countdown;

pub use config::{TimerConfig, PREPARE_SECS};
pub use countdown::{IntervalTimer, Phase, TimerId, TimerSnapshot, TimerState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, TimerId};

/// A discrete emission from a running timer, produced by `tick()` at the
/// moment of the corresponding transition and forwarded to the cue and
/// notification collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Signal {
    /// Five seconds left in the current phase.
    Warning,
    /// Three, two, one.
    Countdown { seconds_left: u32 },
    /// Preparation finished; the first work interval begins.
    WorkStarted,
    /// A work interval ended; rest begins.
    RestStarted,
    /// Rest ended; the next round's work interval begins.
    RoundStarted,
    /// The repetition target was met; the timer is done.
    Completed,
}

/// Outcome of a lifecycle operation on a timer.
/// Operations that were state-ineligible no-ops produce no event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        id: TimerId,
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        id: TimerId,
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        id: TimerId,
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        id: TimerId,
        at: DateTime<Utc>,
    },
    TimerDeleted {
        id: TimerId,
        at: DateTime<Utc>,
    },
}

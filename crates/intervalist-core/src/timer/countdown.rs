//! Interval timer state machine.
//!
//! The state machine is tick-driven and holds no clock of its own: whoever
//! owns the timer calls `tick()` once per second while it is running and
//! forwards the returned signals. The async engine does this from a tokio
//! task; tests call it directly.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed
//! ```
//!
//! While Running or Paused the timer is inside one of three phases:
//! Prepare (fixed 5 s) -> Work -> Rest -> Work -> ... until the configured
//! repetition count is met. Prepare runs only once, before the first work
//! interval.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::{TimerConfig, PREPARE_SECS};
use crate::events::{Event, Signal};

/// Unique timer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(Uuid);

impl TimerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Sub-interval within one cycle of a running timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Prepare,
    Work,
    Rest,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Prepare => write!(f, "prepare"),
            Phase::Work => write!(f, "work"),
            Phase::Rest => write!(f, "rest"),
        }
    }
}

/// One configured countdown session.
///
/// Phase is `Some` exactly while the state is Running or Paused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalTimer {
    id: TimerId,
    config: TimerConfig,
    state: TimerState,
    phase: Option<Phase>,
    remaining_secs: u32,
    completed_repetitions: u32,
    /// When the timer was paused. Informational only -- resuming picks up
    /// from the preserved remaining seconds, not from wall-clock time.
    #[serde(default)]
    paused_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Point-in-time copy of a timer's externally visible fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub id: TimerId,
    pub name: String,
    pub state: TimerState,
    pub phase: Option<Phase>,
    pub remaining_secs: u32,
    /// Length of the current phase, for progress rendering.
    pub phase_total_secs: u32,
    pub completed_repetitions: u32,
    pub repetitions: u32,
    pub work_secs: u32,
    pub rest_secs: u32,
    pub paused_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl IntervalTimer {
    /// Create a timer in Idle with the remaining time preset to the work
    /// duration.
    pub fn new(config: TimerConfig) -> Self {
        let remaining_secs = config.work_secs;
        Self {
            id: TimerId::new(),
            config,
            state: TimerState::Idle,
            phase: None,
            remaining_secs,
            completed_repetitions: 0,
            paused_at: None,
            created_at: Utc::now(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn completed_repetitions(&self) -> u32 {
        self.completed_repetitions
    }

    pub fn paused_at(&self) -> Option<DateTime<Utc>> {
        self.paused_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Length of the current phase in seconds, 0 outside Running/Paused.
    pub fn phase_total_secs(&self) -> u32 {
        match self.phase {
            Some(Phase::Prepare) => PREPARE_SECS,
            Some(Phase::Work) => self.config.work_secs,
            Some(Phase::Rest) => self.config.rest_secs,
            None => 0,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            id: self.id,
            name: self.config.name.clone(),
            state: self.state,
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            phase_total_secs: self.phase_total_secs(),
            completed_repetitions: self.completed_repetitions,
            repetitions: self.config.repetitions,
            work_secs: self.config.work_secs,
            rest_secs: self.config.rest_secs,
            paused_at: self.paused_at,
            created_at: self.created_at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle: begin the preparation countdown. Paused: resume with phase and
    /// remaining seconds untouched. No-op in any other state.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running;
                self.phase = Some(Phase::Prepare);
                self.remaining_secs = PREPARE_SECS;
                Some(Event::TimerStarted {
                    id: self.id,
                    phase: Phase::Prepare,
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Paused => {
                let phase = self.phase?;
                self.state = TimerState::Running;
                self.paused_at = None;
                Some(Event::TimerResumed {
                    id: self.id,
                    phase,
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Running | TimerState::Completed => None,
        }
    }

    /// Only valid from Running. Records the pause instant; remaining time
    /// is left exactly as it was.
    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        let phase = self.phase?;
        self.state = TimerState::Paused;
        self.paused_at = Some(Utc::now());
        Some(Event::TimerPaused {
            id: self.id,
            phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// `start` restricted to the Paused state.
    pub fn resume(&mut self) -> Option<Event> {
        if self.state != TimerState::Paused {
            return None;
        }
        self.start()
    }

    /// Back to the freshly created state.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.phase = None;
        self.remaining_secs = self.config.work_secs;
        self.completed_repetitions = 0;
        self.paused_at = None;
        Some(Event::TimerReset {
            id: self.id,
            at: Utc::now(),
        })
    }

    /// One one-second advancement. Returns the signals emitted by this
    /// tick, in order. No-op unless Running.
    ///
    /// The warning/countdown check runs against the remaining value before
    /// the decrement, so a phase of exactly 5 seconds still gets its single
    /// warning on its first tick.
    pub fn tick(&mut self) -> Vec<Signal> {
        if self.state != TimerState::Running {
            return Vec::new();
        }
        let mut signals = Vec::new();
        match self.remaining_secs {
            5 => signals.push(Signal::Warning),
            secs @ 1..=3 => signals.push(Signal::Countdown { seconds_left: secs }),
            _ => {}
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.advance_phase(&mut signals);
        }
        signals
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance_phase(&mut self, signals: &mut Vec<Signal>) {
        match self.phase {
            Some(Phase::Prepare) => {
                self.phase = Some(Phase::Work);
                self.remaining_secs = self.config.work_secs;
                signals.push(Signal::WorkStarted);
            }
            Some(Phase::Work) => {
                self.completed_repetitions += 1;
                if self.completed_repetitions >= self.config.repetitions {
                    self.state = TimerState::Completed;
                    self.phase = None;
                    self.remaining_secs = 0;
                    signals.push(Signal::Completed);
                } else {
                    self.phase = Some(Phase::Rest);
                    self.remaining_secs = self.config.rest_secs;
                    signals.push(Signal::RestStarted);
                }
            }
            Some(Phase::Rest) => {
                self.phase = Some(Phase::Work);
                self.remaining_secs = self.config.work_secs;
                signals.push(Signal::RoundStarted);
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn timer(work: u32, rest: u32, reps: u32) -> IntervalTimer {
        IntervalTimer::new(TimerConfig::new("test", 0, work, rest, reps))
    }

    /// Tick until the current phase changes, collecting signals.
    fn tick_through_phase(timer: &mut IntervalTimer) -> Vec<Signal> {
        let phase = timer.phase();
        let mut signals = Vec::new();
        while timer.phase() == phase && timer.state() == TimerState::Running {
            signals.extend(timer.tick());
        }
        signals
    }

    #[test]
    fn create_presets_remaining_to_work_duration() {
        let t = IntervalTimer::new(TimerConfig::new("warmup", 1, 30, 20, 3));
        assert_eq!(t.state(), TimerState::Idle);
        assert_eq!(t.phase(), None);
        assert_eq!(t.remaining_secs(), 90);
        assert_eq!(t.completed_repetitions(), 0);
    }

    #[test]
    fn start_enters_prepare_with_five_seconds() {
        let mut t = timer(120, 60, 10);
        let event = t.start().unwrap();
        assert!(matches!(event, Event::TimerStarted { remaining_secs: 5, .. }));
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.phase(), Some(Phase::Prepare));
        assert_eq!(t.remaining_secs(), 5);
    }

    #[test]
    fn full_cycle_walkthrough() {
        // work=2, rest=1, repetitions=2, stepped tick by tick
        let mut t = timer(2, 1, 2);
        t.start();

        for _ in 0..5 {
            assert_eq!(t.phase(), Some(Phase::Prepare));
            t.tick();
        }
        assert_eq!(t.phase(), Some(Phase::Work));
        assert_eq!(t.remaining_secs(), 2);

        t.tick();
        t.tick();
        assert_eq!(t.completed_repetitions(), 1);
        assert_eq!(t.phase(), Some(Phase::Rest));
        assert_eq!(t.remaining_secs(), 1);

        t.tick();
        assert_eq!(t.phase(), Some(Phase::Work));
        assert_eq!(t.remaining_secs(), 2);

        t.tick();
        let signals = t.tick();
        assert_eq!(t.completed_repetitions(), 2);
        assert_eq!(t.state(), TimerState::Completed);
        assert_eq!(t.phase(), None);
        assert_eq!(t.remaining_secs(), 0);
        assert!(signals.contains(&Signal::Completed));

        // Nothing moves once completed.
        assert!(t.tick().is_empty());
        assert_eq!(t.remaining_secs(), 0);
        assert_eq!(t.completed_repetitions(), 2);
    }

    #[test]
    fn sprint_session_skips_rest_entirely() {
        // One repetition: prepare, work, done -- the rest phase never runs.
        let mut t = timer(10, 5, 1);
        t.start();
        for _ in 0..5 {
            t.tick();
        }
        assert_eq!(t.phase(), Some(Phase::Work));
        assert_eq!(t.remaining_secs(), 10);
        for _ in 0..9 {
            t.tick();
            assert_ne!(t.phase(), Some(Phase::Rest));
        }
        let signals = t.tick();
        assert_eq!(signals.last(), Some(&Signal::Completed));
        assert_eq!(t.state(), TimerState::Completed);
        assert_eq!(t.completed_repetitions(), 1);
        assert_eq!(t.remaining_secs(), 0);
    }

    #[test]
    fn pause_resume_roundtrip_preserves_position() {
        let mut t = timer(30, 10, 3);
        t.start();
        t.tick();
        t.tick();
        let remaining = t.remaining_secs();
        let phase = t.phase();

        assert!(t.pause().is_some());
        assert_eq!(t.state(), TimerState::Paused);
        assert!(t.paused_at().is_some());

        assert!(t.resume().is_some());
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.remaining_secs(), remaining);
        assert_eq!(t.phase(), phase);
        assert!(t.paused_at().is_none());
    }

    #[test]
    fn pause_is_a_noop_outside_running() {
        let mut t = timer(2, 1, 1);
        assert!(t.pause().is_none());
        assert_eq!(t.state(), TimerState::Idle);

        t.start();
        for _ in 0..7 {
            t.tick();
        }
        assert_eq!(t.state(), TimerState::Completed);
        assert!(t.pause().is_none());
        assert_eq!(t.state(), TimerState::Completed);
    }

    #[test]
    fn start_is_a_noop_while_running() {
        let mut t = timer(30, 10, 3);
        t.start();
        t.tick();
        let remaining = t.remaining_secs();
        assert!(t.start().is_none());
        assert_eq!(t.remaining_secs(), remaining);
        assert_eq!(t.phase(), Some(Phase::Prepare));
    }

    #[test]
    fn start_is_a_noop_once_completed() {
        let mut t = timer(1, 1, 1);
        t.start();
        for _ in 0..6 {
            t.tick();
        }
        assert_eq!(t.state(), TimerState::Completed);
        assert!(t.start().is_none());
        assert_eq!(t.state(), TimerState::Completed);
    }

    #[test]
    fn resume_only_acts_from_paused() {
        let mut t = timer(30, 10, 3);
        assert!(t.resume().is_none());
        t.start();
        assert!(t.resume().is_none());
    }

    #[test]
    fn warning_and_countdown_fire_once_per_phase() {
        let mut t = timer(8, 6, 2);
        t.start();

        // Prepare is exactly 5 seconds long, so the warning fires on its
        // first tick and the countdown on the last three.
        let prepare = tick_through_phase(&mut t);
        assert_eq!(
            prepare.iter().filter(|s| **s == Signal::Warning).count(),
            1
        );
        for secs in 1..=3 {
            assert_eq!(
                prepare
                    .iter()
                    .filter(|s| **s == Signal::Countdown { seconds_left: secs })
                    .count(),
                1
            );
        }

        let work = tick_through_phase(&mut t);
        assert_eq!(work.iter().filter(|s| **s == Signal::Warning).count(), 1);
        for secs in 1..=3 {
            assert_eq!(
                work.iter()
                    .filter(|s| **s == Signal::Countdown { seconds_left: secs })
                    .count(),
                1
            );
        }
    }

    #[test]
    fn short_phase_gets_no_warning() {
        let mut t = timer(3, 1, 1);
        t.start();
        for _ in 0..5 {
            t.tick();
        }
        assert_eq!(t.phase(), Some(Phase::Work));
        let work = tick_through_phase(&mut t);
        assert!(!work.contains(&Signal::Warning));
        assert_eq!(
            work.iter()
                .filter(|s| matches!(s, Signal::Countdown { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn zero_length_rest_advances_in_one_tick() {
        let mut t = timer(1, 0, 2);
        t.start();
        for _ in 0..5 {
            t.tick();
        }
        assert_eq!(t.phase(), Some(Phase::Work));

        let signals = t.tick();
        assert!(signals.contains(&Signal::RestStarted));
        assert_eq!(t.phase(), Some(Phase::Rest));
        assert_eq!(t.remaining_secs(), 0);

        let signals = t.tick();
        assert!(signals.contains(&Signal::RoundStarted));
        assert_eq!(t.phase(), Some(Phase::Work));
        assert_eq!(t.remaining_secs(), 1);

        let signals = t.tick();
        assert!(signals.contains(&Signal::Completed));
        assert_eq!(t.state(), TimerState::Completed);
    }

    #[test]
    fn zero_repetitions_completes_after_first_work_interval() {
        let mut t = timer(2, 1, 0);
        t.start();
        for _ in 0..5 {
            t.tick();
        }
        t.tick();
        let signals = t.tick();
        assert!(signals.contains(&Signal::Completed));
        assert_eq!(t.state(), TimerState::Completed);
        assert_eq!(t.completed_repetitions(), 1);
    }

    #[test]
    fn reset_rearms_a_completed_timer() {
        let mut t = timer(1, 1, 1);
        t.start();
        for _ in 0..6 {
            t.tick();
        }
        assert_eq!(t.state(), TimerState::Completed);

        t.reset();
        assert_eq!(t.state(), TimerState::Idle);
        assert_eq!(t.phase(), None);
        assert_eq!(t.remaining_secs(), 1);
        assert_eq!(t.completed_repetitions(), 0);

        let event = t.start().unwrap();
        assert!(matches!(event, Event::TimerStarted { .. }));
    }

    #[test]
    fn snapshot_reflects_runtime_fields() {
        let mut t = timer(20, 10, 4);
        t.start();
        t.tick();
        let snap = t.snapshot();
        assert_eq!(snap.id, t.id());
        assert_eq!(snap.state, TimerState::Running);
        assert_eq!(snap.phase, Some(Phase::Prepare));
        assert_eq!(snap.remaining_secs, 4);
        assert_eq!(snap.phase_total_secs, 5);
        assert_eq!(snap.work_secs, 20);
        assert_eq!(snap.rest_secs, 10);
        assert_eq!(snap.repetitions, 4);
    }

    proptest! {
        #[test]
        fn any_configuration_runs_to_completion(
            work in 0u32..=120,
            rest in 0u32..=60,
            reps in 0u32..=10,
        ) {
            let mut t = timer(work, rest, reps);
            t.start();
            let target = reps.max(1);
            // Zero-length phases consume one tick each.
            let bound = (PREPARE_SECS + target * (work + 1) + target * (rest + 1)) as usize + 8;
            let mut ticks = 0usize;
            while t.state() == TimerState::Running {
                prop_assert!(ticks < bound, "no completion within {} ticks", bound);
                t.tick();
                ticks += 1;
                prop_assert!(t.completed_repetitions() <= target);
                prop_assert!(t.remaining_secs() <= work.max(rest).max(PREPARE_SECS));
            }
            prop_assert_eq!(t.state(), TimerState::Completed);
            prop_assert_eq!(t.remaining_secs(), 0);
            prop_assert_eq!(t.completed_repetitions(), target);
        }
    }
}

//! Async timer engine.
//!
//! `TimerEngine` owns the active timer set. Each running timer is paired
//! with exactly one cancellable tokio task that ticks it once per second;
//! timers never observe or block on each other. Signals are dispatched to
//! the cue/notifier collaborators synchronously at the transition, before
//! the loop's next sleep, and the full snapshot list is published through a
//! watch channel after every mutation.
//!
//! Cancellation is explicit: `pause` and `delete` abort the tick task
//! before returning, and a tick that lost that race re-checks state under
//! the registry lock before touching anything. Tick tasks hold only a weak
//! handle to the engine internals, so dropping the engine stops every loop
//! even without `shutdown()`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cues::{CuePlayer, Notifier, NoopCues, NoopNotifier};
use crate::error::EngineError;
use crate::events::{Event, Signal};
use crate::timer::{IntervalTimer, TimerConfig, TimerId, TimerSnapshot, TimerState};

const TICK_PERIOD: Duration = Duration::from_secs(1);

struct Entry {
    timer: IntervalTimer,
    /// Cancellation handle for the tick loop. `Some` only while a loop is
    /// live for this timer.
    ticker: Option<JoinHandle<()>>,
    /// Bumped on every loop spawn and cancellation. A tick task carries the
    /// epoch it was spawned under; a mismatch marks it stale, so an aborted
    /// task that was blocked on the registry lock can never tick a timer
    /// whose loop has since been replaced.
    epoch: u64,
}

type Registry = HashMap<TimerId, Entry>;

struct Inner {
    timers: Mutex<Registry>,
    cues: Arc<dyn CuePlayer>,
    notifier: Arc<dyn Notifier>,
    snapshots: watch::Sender<Vec<TimerSnapshot>>,
}

/// Coordinator for zero or more independent countdown timers.
pub struct TimerEngine {
    inner: Arc<Inner>,
}

impl TimerEngine {
    /// Engine with no-op collaborators.
    pub fn new() -> Self {
        Self::with_sinks(Arc::new(NoopCues), Arc::new(NoopNotifier))
    }

    pub fn with_sinks(cues: Arc<dyn CuePlayer>, notifier: Arc<dyn Notifier>) -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                timers: Mutex::new(HashMap::new()),
                cues,
                notifier,
                snapshots,
            }),
        }
    }

    /// Add a new Idle timer to the active set.
    pub fn create(&self, config: TimerConfig) -> Result<TimerSnapshot, EngineError> {
        let timer = IntervalTimer::new(config);
        let snapshot = timer.snapshot();
        let mut timers = self.inner.lock_timers()?;
        timers.insert(
            timer.id(),
            Entry {
                timer,
                ticker: None,
                epoch: 0,
            },
        );
        self.inner.publish(&timers);
        info!(timer = %snapshot.id, name = %snapshot.name, "timer created");
        Ok(snapshot)
    }

    /// Start an Idle timer or resume a Paused one, spawning its tick loop.
    /// `Ok(None)` when the timer was not eligible (already running, or
    /// completed).
    pub fn start(&self, id: TimerId) -> Result<Option<Event>, EngineError> {
        self.run_from(id, false)
    }

    /// `start` restricted to Paused timers.
    pub fn resume(&self, id: TimerId) -> Result<Option<Event>, EngineError> {
        self.run_from(id, true)
    }

    fn run_from(&self, id: TimerId, paused_only: bool) -> Result<Option<Event>, EngineError> {
        let mut timers = self.inner.lock_timers()?;
        let entry = timers.get_mut(&id).ok_or(EngineError::TimerNotFound(id))?;
        let event = if paused_only {
            entry.timer.resume()
        } else {
            entry.timer.start()
        };
        if event.is_some() {
            if entry.ticker.is_none() {
                entry.epoch += 1;
                entry.ticker = Some(Inner::spawn_ticker(&self.inner, id, entry.epoch));
            }
            self.inner.publish(&timers);
            debug!(timer = %id, "tick loop running");
        }
        Ok(event)
    }

    /// Pause a Running timer. The tick loop is cancelled before this
    /// returns; no further tick for this timer is observable.
    pub fn pause(&self, id: TimerId) -> Result<Option<Event>, EngineError> {
        let mut timers = self.inner.lock_timers()?;
        let entry = timers.get_mut(&id).ok_or(EngineError::TimerNotFound(id))?;
        let event = entry.timer.pause();
        if event.is_some() {
            entry.epoch += 1;
            if let Some(handle) = entry.ticker.take() {
                handle.abort();
            }
            self.inner.publish(&timers);
            info!(timer = %id, "timer paused");
        }
        Ok(event)
    }

    /// Return a timer to its freshly created state, cancelling any loop.
    pub fn reset(&self, id: TimerId) -> Result<Option<Event>, EngineError> {
        let mut timers = self.inner.lock_timers()?;
        let entry = timers.get_mut(&id).ok_or(EngineError::TimerNotFound(id))?;
        entry.epoch += 1;
        if let Some(handle) = entry.ticker.take() {
            handle.abort();
        }
        let event = entry.timer.reset();
        self.inner.publish(&timers);
        info!(timer = %id, "timer reset");
        Ok(event)
    }

    /// Remove a timer unconditionally, in any state, cancelling its loop.
    pub fn delete(&self, id: TimerId) -> Result<Event, EngineError> {
        let mut timers = self.inner.lock_timers()?;
        let entry = timers.remove(&id).ok_or(EngineError::TimerNotFound(id))?;
        if let Some(handle) = entry.ticker {
            handle.abort();
        }
        self.inner.publish(&timers);
        info!(timer = %id, "timer deleted");
        Ok(Event::TimerDeleted { id, at: Utc::now() })
    }

    pub fn get(&self, id: TimerId) -> Result<TimerSnapshot, EngineError> {
        let timers = self.inner.lock_timers()?;
        timers
            .get(&id)
            .map(|entry| entry.timer.snapshot())
            .ok_or(EngineError::TimerNotFound(id))
    }

    /// All timers, ordered by creation time.
    pub fn list(&self) -> Result<Vec<TimerSnapshot>, EngineError> {
        let timers = self.inner.lock_timers()?;
        Ok(snapshot_list(&timers))
    }

    /// Push-on-change stream of the full snapshot list. Every mutation,
    /// including every tick, is visible immediately after it occurs.
    pub fn subscribe(&self) -> watch::Receiver<Vec<TimerSnapshot>> {
        self.inner.snapshots.subscribe()
    }

    /// Cancel every live tick loop. Also runs on drop.
    pub fn shutdown(&self) {
        if let Ok(mut timers) = self.inner.timers.lock() {
            for entry in timers.values_mut() {
                entry.epoch += 1;
                if let Some(handle) = entry.ticker.take() {
                    handle.abort();
                }
            }
        }
        debug!("all tick loops cancelled");
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn lock_timers(&self) -> Result<MutexGuard<'_, Registry>, EngineError> {
        self.timers.lock().map_err(|_| EngineError::RegistryPoisoned)
    }

    /// Rebuild and publish the snapshot list. Called with the registry
    /// lock held.
    fn publish(&self, timers: &Registry) {
        self.snapshots.send_replace(snapshot_list(timers));
    }

    fn dispatch(&self, timer: &TimerSnapshot, signals: &[Signal]) {
        for signal in signals {
            match signal {
                Signal::Warning => self.cues.warning(timer),
                Signal::Countdown { seconds_left } => self.cues.countdown(timer, *seconds_left),
                Signal::WorkStarted => self.cues.work_started(timer),
                Signal::RestStarted => {
                    self.cues.rest_started(timer);
                    self.notifier.work_interval_ended(timer);
                }
                Signal::RoundStarted => {
                    self.cues.round_started(timer);
                    self.notifier.rest_interval_ended(timer);
                }
                Signal::Completed => {
                    self.cues.completed(timer);
                    self.notifier.session_completed(timer);
                }
            }
        }
    }

    /// Apply one tick to the given timer. Returns false when the loop
    /// should stop.
    fn apply_tick(inner: &Arc<Inner>, id: TimerId, epoch: u64) -> bool {
        let (snapshot, signals, keep_ticking) = {
            let mut timers = match inner.timers.lock() {
                Ok(guard) => guard,
                Err(_) => return false,
            };
            let Some(entry) = timers.get_mut(&id) else {
                return false;
            };
            // A tick that raced with a cancellation must not touch the
            // timer: pause/reset/shutdown bump the epoch under this lock.
            if entry.epoch != epoch || entry.timer.state() != TimerState::Running {
                return false;
            }
            let signals = entry.timer.tick();
            let done = entry.timer.state() == TimerState::Completed;
            if done {
                // Dropping the handle detaches the task; the loop exits
                // right after this call.
                entry.ticker = None;
                info!(timer = %id, "timer completed");
            }
            let snapshot = entry.timer.snapshot();
            inner.publish(&timers);
            (snapshot, signals, !done)
        };
        // Dispatch outside the lock but ahead of the next sleep, so
        // collaborators fire at the transition without stalling other
        // timers.
        inner.dispatch(&snapshot, &signals);
        keep_ticking
    }

    fn spawn_ticker(inner: &Arc<Inner>, id: TimerId, epoch: u64) -> JoinHandle<()> {
        let weak: Weak<Inner> = Arc::downgrade(inner);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(TICK_PERIOD);
            tick.tick().await; // the first tick completes immediately
            loop {
                tick.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                if !Inner::apply_tick(&inner, id, epoch) {
                    break;
                }
            }
        })
    }
}

fn snapshot_list(timers: &Registry) -> Vec<TimerSnapshot> {
    let mut list: Vec<TimerSnapshot> = timers.values().map(|e| e.timer.snapshot()).collect();
    list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_lists_in_creation_order() {
        let engine = TimerEngine::new();
        let a = engine.create(TimerConfig::new("first", 0, 10, 5, 2)).unwrap();
        let b = engine.create(TimerConfig::new("second", 0, 20, 5, 2)).unwrap();
        let list = engine.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, a.id);
        assert_eq!(list[1].id, b.id);
    }

    #[test]
    fn pause_before_start_is_a_noop() {
        let engine = TimerEngine::new();
        let t = engine.create(TimerConfig::new("idle", 0, 10, 5, 1)).unwrap();
        assert!(engine.pause(t.id).unwrap().is_none());
        assert_eq!(engine.get(t.id).unwrap().state, TimerState::Idle);
    }

    #[test]
    fn unknown_ids_error_without_a_runtime() {
        let engine = TimerEngine::new();
        let missing = TimerId::new();
        assert!(matches!(
            engine.get(missing),
            Err(EngineError::TimerNotFound(_))
        ));
        assert!(matches!(
            engine.delete(missing),
            Err(EngineError::TimerNotFound(_))
        ));
    }

    #[test]
    fn delete_removes_an_idle_timer() {
        let engine = TimerEngine::new();
        let t = engine.create(TimerConfig::new("gone", 0, 10, 5, 1)).unwrap();
        let event = engine.delete(t.id).unwrap();
        assert!(matches!(event, Event::TimerDeleted { .. }));
        assert!(engine.list().unwrap().is_empty());
    }
}

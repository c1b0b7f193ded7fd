use std::error::Error;

use clap::Args;
use intervalist_core::{IntervalTimer, Phase, Signal, TimerConfig, TimerState};
use serde::Serialize;

#[derive(Args)]
pub struct SimulateArgs {
    /// Display name for the timer
    #[arg(long, default_value = "workout")]
    name: String,
    /// Work interval minutes
    #[arg(long, default_value_t = 0)]
    work_min: u32,
    /// Work interval seconds
    #[arg(long, default_value_t = 30)]
    work_sec: u32,
    /// Rest interval seconds
    #[arg(long, default_value_t = 15)]
    rest_sec: u32,
    /// Number of work intervals
    #[arg(long, default_value_t = 3)]
    reps: u32,
    /// Upper bound on simulated ticks
    #[arg(long, default_value_t = 36_000)]
    max_ticks: u32,
}

#[derive(Serialize)]
struct TickRecord {
    tick: u32,
    state: TimerState,
    phase: Option<Phase>,
    remaining_secs: u32,
    completed_repetitions: u32,
    signals: Vec<Signal>,
}

#[derive(Serialize)]
struct SessionTrace {
    name: String,
    work_secs: u32,
    rest_secs: u32,
    repetitions: u32,
    total_secs: u64,
    ticks: Vec<TickRecord>,
}

/// Step a timer through its whole session without waiting for the clock.
pub fn run(args: SimulateArgs) -> Result<(), Box<dyn Error>> {
    let config = TimerConfig::new(
        args.name,
        args.work_min,
        args.work_sec,
        args.rest_sec,
        args.reps.max(1),
    );
    let total_secs = config.total_secs();
    let mut timer = IntervalTimer::new(config);
    timer.start();

    let mut ticks = Vec::new();
    let mut n = 0;
    while timer.state() == TimerState::Running && n < args.max_ticks {
        n += 1;
        let signals = timer.tick();
        ticks.push(TickRecord {
            tick: n,
            state: timer.state(),
            phase: timer.phase(),
            remaining_secs: timer.remaining_secs(),
            completed_repetitions: timer.completed_repetitions(),
            signals,
        });
    }

    let trace = SessionTrace {
        name: timer.name().to_string(),
        work_secs: timer.config().work_secs,
        rest_secs: timer.config().rest_secs,
        repetitions: timer.config().repetitions,
        total_secs,
        ticks,
    };
    println!("{}", serde_json::to_string_pretty(&trace)?);
    Ok(())
}

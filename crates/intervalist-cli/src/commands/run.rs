use std::error::Error;
use std::sync::Arc;

use clap::Args;
use intervalist_core::cues::{CuePlayer, Notifier};
use intervalist_core::{Config, NoopCues, NoopNotifier, TimerConfig, TimerEngine, TimerState};

use crate::cues::{LogNotifier, TerminalCues};

#[derive(Args)]
pub struct RunArgs {
    /// Display name for the timer
    #[arg(long, default_value = "workout")]
    name: String,
    /// Work interval minutes
    #[arg(long)]
    work_min: Option<u32>,
    /// Work interval seconds
    #[arg(long)]
    work_sec: Option<u32>,
    /// Rest interval seconds
    #[arg(long)]
    rest_sec: Option<u32>,
    /// Number of work intervals
    #[arg(long)]
    reps: Option<u32>,
    /// Disable the terminal bell
    #[arg(long)]
    no_bell: bool,
}

pub async fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let config = Config::load_or_default();
    let timer_config = TimerConfig::new(
        args.name,
        args.work_min.unwrap_or(config.defaults.work_minutes),
        args.work_sec.unwrap_or(config.defaults.work_seconds),
        args.rest_sec.unwrap_or(config.defaults.rest_seconds),
        args.reps.unwrap_or(config.defaults.repetitions).max(1),
    );
    let total_secs = timer_config.total_secs();

    let cues: Arc<dyn CuePlayer> = if config.cues.enabled {
        Arc::new(TerminalCues::new(config.cues.bell && !args.no_bell))
    } else {
        Arc::new(NoopCues)
    };
    let notifier: Arc<dyn Notifier> = if config.notifications.enabled {
        Arc::new(LogNotifier)
    } else {
        Arc::new(NoopNotifier)
    };
    let engine = TimerEngine::with_sinks(cues, notifier);

    let snapshot = engine.create(timer_config)?;
    let id = snapshot.id;
    println!(
        "{}: {} x {}s work / {}s rest ({}s total)",
        snapshot.name, snapshot.repetitions, snapshot.work_secs, snapshot.rest_secs, total_secs
    );

    let mut updates = engine.subscribe();
    engine.start(id)?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = {
                    let list = updates.borrow_and_update();
                    list.iter().find(|t| t.id == id).cloned()
                };
                let Some(current) = current else { break };
                match current.state {
                    TimerState::Running => {
                        if let Some(phase) = current.phase {
                            println!(
                                "  {phase:<7} {:>4}s  round {}/{}",
                                current.remaining_secs,
                                current.completed_repetitions,
                                current.repetitions
                            );
                        }
                    }
                    TimerState::Completed => break,
                    _ => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                engine.shutdown();
                break;
            }
        }
    }
    Ok(())
}

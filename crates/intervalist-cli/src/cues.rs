//! Terminal collaborators for the live `run` command.

use intervalist_core::cues::{CuePlayer, Notifier};
use intervalist_core::TimerSnapshot;

/// Rings the terminal bell and prints a line per audio cue.
pub struct TerminalCues {
    bell: bool,
}

impl TerminalCues {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }

    fn cue(&self, text: &str) {
        if self.bell {
            print!("\x07");
        }
        println!("{text}");
    }
}

impl CuePlayer for TerminalCues {
    fn warning(&self, _timer: &TimerSnapshot) {
        self.cue("5 seconds left");
    }

    fn countdown(&self, _timer: &TimerSnapshot, seconds_left: u32) {
        self.cue(&format!("{seconds_left}..."));
    }

    fn work_started(&self, timer: &TimerSnapshot) {
        self.cue(&format!("GO -- work for {}s", timer.work_secs));
    }

    fn rest_started(&self, timer: &TimerSnapshot) {
        self.cue(&format!("rest for {}s", timer.rest_secs));
    }

    fn round_started(&self, timer: &TimerSnapshot) {
        self.cue(&format!(
            "round {}/{} -- work for {}s",
            timer.completed_repetitions + 1,
            timer.repetitions,
            timer.work_secs
        ));
    }

    fn completed(&self, timer: &TimerSnapshot) {
        self.cue(&format!(
            "done -- {} rounds completed",
            timer.completed_repetitions
        ));
    }
}

/// Forwards boundary notifications to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn work_interval_ended(&self, timer: &TimerSnapshot) {
        tracing::info!(
            timer = %timer.name,
            rounds = timer.completed_repetitions,
            "work interval finished"
        );
    }

    fn rest_interval_ended(&self, timer: &TimerSnapshot) {
        tracing::info!(timer = %timer.name, "rest finished");
    }

    fn session_completed(&self, timer: &TimerSnapshot) {
        tracing::info!(
            timer = %timer.name,
            rounds = timer.completed_repetitions,
            "session complete"
        );
    }
}

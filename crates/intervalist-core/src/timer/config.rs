use serde::{Deserialize, Serialize};

/// Seconds of preparation countdown before the first work interval.
pub const PREPARE_SECS: u32 = 5;

/// Immutable configuration of one timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Display name.
    pub name: String,
    /// Work interval length in seconds.
    pub work_secs: u32,
    /// Rest interval length in seconds.
    pub rest_secs: u32,
    /// Number of work intervals to complete.
    pub repetitions: u32,
}

impl TimerConfig {
    /// Build a configuration from the split minutes/seconds form the
    /// presentation layer collects.
    ///
    /// Uses saturating arithmetic so oversized inputs cannot overflow.
    pub fn new(
        name: impl Into<String>,
        work_minutes: u32,
        work_seconds: u32,
        rest_seconds: u32,
        repetitions: u32,
    ) -> Self {
        Self {
            name: name.into(),
            work_secs: work_minutes.saturating_mul(60).saturating_add(work_seconds),
            rest_secs: rest_seconds,
            repetitions,
        }
    }

    /// Full session length in seconds: preparation, every work interval,
    /// and the rests between them (no rest after the last work interval).
    pub fn total_secs(&self) -> u64 {
        let work = u64::from(self.repetitions) * u64::from(self.work_secs);
        let rests = u64::from(self.repetitions.saturating_sub(1)) * u64::from(self.rest_secs);
        u64::from(PREPARE_SECS) + work + rests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_fold_into_seconds() {
        let config = TimerConfig::new("Sprint", 2, 30, 15, 4);
        assert_eq!(config.work_secs, 150);
        assert_eq!(config.rest_secs, 15);
        assert_eq!(config.repetitions, 4);
    }

    #[test]
    fn total_excludes_rest_after_last_round() {
        let config = TimerConfig::new("Tabata", 0, 20, 10, 8);
        assert_eq!(config.total_secs(), 5 + 8 * 20 + 7 * 10);
    }

    #[test]
    fn total_of_single_round_has_no_rest() {
        let config = TimerConfig::new("Sprint", 0, 10, 5, 1);
        assert_eq!(config.total_secs(), 15);
    }

    #[test]
    fn oversized_minutes_saturate() {
        let config = TimerConfig::new("big", u32::MAX, 59, 0, 1);
        assert_eq!(config.work_secs, u32::MAX);
    }
}

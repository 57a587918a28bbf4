//! Failure counting and sleep selection between cycles.

use std::time::Duration;

/// Timing of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    /// Sleep between cycles.
    pub interval: Duration,
    /// Sleep used instead of `interval` once failures reach the threshold.
    pub backoff_pause: Duration,
    /// Consecutive failures that trigger `backoff_pause`. Zero disables it.
    pub error_threshold: u32,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            backoff_pause: Duration::from_secs(300),
            error_threshold: 5,
        }
    }
}

/// Which sleep follows a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDelay {
    Interval(Duration),
    Backoff(Duration),
}

impl PollDelay {
    pub fn duration(self) -> Duration {
        match self {
            Self::Interval(d) | Self::Backoff(d) => d,
        }
    }
}

/// Consecutive failed cycles, owned by the poll loop.
///
/// Threaded through the loop by value: each cycle result produces the next
/// tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureTracker {
    consecutive: u32,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consecutive(self) -> u32 {
        self.consecutive
    }

    /// Tracker after a cycle: success resets, failure increments.
    pub fn after_cycle(self, succeeded: bool) -> Self {
        if succeeded {
            Self { consecutive: 0 }
        } else {
            Self {
                consecutive: self.consecutive.saturating_add(1),
            }
        }
    }

    /// The sleep to take before the next cycle.
    ///
    /// The counter is not reset by the pause itself, so every further failure
    /// past the threshold pauses again until a cycle succeeds.
    pub fn next_delay(self, schedule: &PollSchedule) -> PollDelay {
        if schedule.error_threshold > 0 && self.consecutive >= schedule.error_threshold {
            PollDelay::Backoff(schedule.backoff_pause)
        } else {
            PollDelay::Interval(schedule.interval)
        }
    }
}

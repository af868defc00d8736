use std::time::{Duration, Instant};

/// Answers "is it time to do this again?" for a fixed period. Each timer
/// belongs to exactly one view, and only that view ever fires it.
#[derive(Clone, Debug)]
pub struct PeriodicTimer {
    period: Duration,
    last_fired: Option<Instant>,
}

impl PeriodicTimer {
    /// Create a timer that is due immediately
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_fired: None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_fired {
            None => true,
            // A clock that went backwards counts as zero elapsed
            Some(last_fired) => {
                now.saturating_duration_since(last_fired) >= self.period
            }
        }
    }

    pub fn mark_fired(&mut self, now: Instant) {
        self.last_fired = Some(now);
    }
}

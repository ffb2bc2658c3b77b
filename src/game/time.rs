//! Regeneration clock
//!
//! Counts down to the next full rebuild from the elapsed time the tick
//! scheduler feeds in.

use std::time::Duration;

/// Repeating countdown driven by tick deltas
#[derive(Debug, Clone)]
pub struct RegenTimer {
    /// Total elapsed time in seconds
    elapsed: f64,
    /// Seconds between firings
    interval: f64,
    /// Time since the last firing
    since_last: f64,
}

impl RegenTimer {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            elapsed: 0.0,
            interval: interval_secs.max(f64::EPSILON),
            since_last: 0.0,
        }
    }

    /// Advance the clock; true if the interval elapsed. A delta spanning
    /// several intervals still fires once.
    pub fn update(&mut self, delta: Duration) -> bool {
        let delta_secs = delta.as_secs_f64();
        self.elapsed += delta_secs;
        self.since_last += delta_secs;

        if self.since_last >= self.interval {
            self.since_last %= self.interval;
            true
        } else {
            false
        }
    }

    /// Seconds left until the next firing
    pub fn remaining(&self) -> f64 {
        self.interval - self.since_last
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.since_last = 0.0;
    }
}

// Timing for the staged draw animation.
//
// The pointer steps through the eligible names at a fixed interval, then
// decelerates over the final stretch. The schedule only produces delays; it
// has no influence on who wins.

use std::time::Duration;

/// Parameters of the spin animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinTiming {
    /// Total time the pointer spins before the result commits.
    pub total: Duration,
    /// Delay between the first steps.
    pub interval: Duration,
    /// Added to the delay on each step once deceleration starts.
    pub slowdown_step: Duration,
    /// Fraction of `total` after which the pointer decelerates.
    pub slowdown_after: f64,
}

impl Default for SpinTiming {
    fn default() -> Self {
        SpinTiming {
            total: Duration::from_millis(3000),
            interval: Duration::from_millis(50),
            slowdown_step: Duration::from_millis(20),
            slowdown_after: 0.7,
        }
    }
}

/// Iterator over the delays between pointer steps.
///
/// Each call accounts for one step. It yields the delay until the next step,
/// or `None` once the accumulated time reaches the total, at which point the
/// draw should commit.
#[derive(Debug, Clone)]
pub struct SpinSchedule {
    timing: SpinTiming,
    elapsed: Duration,
    delay: Duration,
}

impl SpinSchedule {
    pub fn new(timing: SpinTiming) -> Self {
        SpinSchedule {
            timing,
            elapsed: Duration::ZERO,
            delay: timing.interval,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn slowdown_threshold(&self) -> Duration {
        self.timing.total.mul_f64(self.timing.slowdown_after.clamp(0.0, 1.0))
    }
}

impl Iterator for SpinSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.delay.is_zero() {
            return None;
        }
        self.elapsed += self.delay;
        if self.elapsed >= self.timing.total {
            return None;
        }
        if self.elapsed > self.slowdown_threshold() {
            self.delay += self.timing.slowdown_step;
        }
        Some(self.delay)
    }
}

/// Advance a pointer over a pool of `len` entries, wrapping at the end.
pub fn advance_cursor(cursor: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (cursor + 1) % len
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

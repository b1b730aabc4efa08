use std::time::{Duration, Instant};

const TIMER_DEC_PER_SECOND: u32 = 60;

/// An 8-bit countdown that sticks at zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub count: u8,
}

impl Timer {
    pub fn new(init_count: u8) -> Self {
        Self { count: init_count }
    }

    pub fn set(&mut self, value: u8) {
        self.count = value;
    }

    /// Decrements once. Returns whether the timer was running.
    pub fn tick(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }
}

/// Divides host wall-clock time into fixed periods.
#[derive(Debug, Clone, Copy)]
pub struct TimerClock {
    period: Duration,
    last_updated: Instant,
}

impl TimerClock {
    /// A 60 Hz clock starting at `start`.
    pub fn new(start: Instant) -> Self {
        Self::with_period(start, Duration::from_secs(1) / TIMER_DEC_PER_SECOND)
    }

    pub fn with_period(start: Instant, period: Duration) -> Self {
        Self {
            period,
            last_updated: start,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of whole periods between the last reference point and `now`.
    /// The reference advances by exactly that many periods so leftover time
    /// carries into the next poll.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last_updated);
        let periods = (elapsed.as_nanos() / self.period.as_nanos()) as u32;
        self.last_updated += self.period * periods;
        periods
    }
}

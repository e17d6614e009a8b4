use std::time::{Duration, Instant};

/// Whole-second countdown that fires and rewinds when it runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    period: u32,
    remaining: u32,
}

impl Countdown {
    pub fn new(period_secs: u32) -> Self {
        let period = period_secs.max(1);
        Self {
            period,
            remaining: period,
        }
    }

    /// Advance by one second. Returns true when the countdown fired, in which
    /// case it has already been rewound to the full period.
    pub fn tick(&mut self) -> bool {
        if self.remaining <= 1 {
            self.remaining = self.period;
            true
        } else {
            self.remaining -= 1;
            false
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.period;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn period(&self) -> u32 {
        self.period
    }
}

/// Longest burst of ticks delivered after a stalled frame.
const MAX_CATCH_UP_TICKS: u32 = 3;

/// Turns frame timestamps into one-per-second ticks.
#[derive(Debug, Clone, Copy)]
pub struct SecondClock {
    last: Instant,
}

impl SecondClock {
    pub fn new(start: Instant) -> Self {
        Self { last: start }
    }

    /// Number of whole seconds that elapsed since the previous tick.
    ///
    /// The fractional remainder carries over. After a long stall only a few
    /// ticks are delivered and the clock resynchronizes to `now`.
    pub fn advance(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last);
        let whole = elapsed.as_secs();
        if whole == 0 {
            return 0;
        }
        if whole > u64::from(MAX_CATCH_UP_TICKS) {
            self.last = now;
            return MAX_CATCH_UP_TICKS;
        }
        self.last += Duration::from_secs(whole);
        whole as u32
    }
}

/// `m:ss` rendering used for the deck countdown.
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

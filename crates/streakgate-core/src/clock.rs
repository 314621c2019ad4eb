//! Time source for lockout windows and calendar-day streaks

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local};

/// Format of a calendar-day string, e.g. `Sun Oct 18 2026`
pub const DAY_FORMAT: &str = "%a %b %d %Y";

/// Source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward (or backward, with a negative duration)
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Local>) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Calendar-day string for a point in time
pub fn day_string(at: DateTime<Local>) -> String {
    at.format(DAY_FORMAT).to_string()
}

/// Calendar-day string for 24 hours before `at`
pub fn previous_day_string(at: DateTime<Local>) -> String {
    day_string(at - Duration::hours(24))
}

//! Deterministic adapters for tests

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use crate::ports::ClockPort;

/// Clock pinned to a settable instant
#[derive(Debug)]
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    /// Clock starting at an arbitrary fixed instant
    pub fn new() -> Self {
        Self::at(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().unwrap_or_default())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward by whole seconds
    pub fn advance_secs(&self, secs: i64) {
        if let Ok(mut now) = self.now.lock() {
            *now += chrono::Duration::seconds(secs);
        }
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}

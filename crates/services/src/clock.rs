//! Clock implementations.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use domains::Clock;
use std::sync::Mutex;

/// Wall clock. Calendar days roll over at midnight in `offset`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Falls back to UTC when the offset is outside ±24h.
    pub fn with_offset_minutes(minutes: i32) -> Self {
        match minutes.checked_mul(60).and_then(FixedOffset::east_opt) {
            Some(offset) => Self { offset },
            None => {
                tracing::warn!(minutes, "daily reset offset out of range, using UTC");
                Self::utc()
            }
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Settable clock for tests and demos.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Midday UTC on the given date.
    pub fn on(date: NaiveDate) -> Self {
        let midnight = date.and_time(NaiveTime::default()).and_utc();
        Self::new(midnight + Duration::hours(12))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

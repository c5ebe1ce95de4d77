//! # Clock
//!
//! The session's source of "now". Core functions take `now` as a parameter;
//! this is the only place that reads the system time.
//!
//! Every instant carries the store's UTC offset, so happy-hour slots are read
//! against the store's wall clock no matter where the host is configured.

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Local, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

// =============================================================================
// System Clock
// =============================================================================

/// Reads the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    /// `None` uses the host's local offset.
    offset: Option<FixedOffset>,
}

impl SystemClock {
    /// Clock in the host's local offset.
    pub fn local() -> Self {
        SystemClock { offset: None }
    }

    /// Clock in a fixed store offset.
    pub fn with_offset(offset: FixedOffset) -> Self {
        SystemClock { offset: Some(offset) }
    }

    /// Clock for a configured offset, falling back to the host's.
    pub fn from_offset(offset: Option<FixedOffset>) -> Self {
        SystemClock { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset),
            None => {
                let local = Local::now();
                local.with_timezone(local.offset())
            }
        }
    }
}

// =============================================================================
// Fixed Clock
// =============================================================================

/// A clock that only moves when told to. For tests and for checking what a
/// promotion catalog offers at a given moment.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        FixedClock { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_system_clock_uses_store_offset() {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let now = SystemClock::with_offset(offset).now();
        assert_eq!(now.offset(), &offset);
    }

    #[test]
    fn test_fixed_clock_advances() {
        let start = FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 6, 15, 18, 59, 0)
            .unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::minutes(1));
        assert_eq!(clock.now().hour(), 19);
        assert_eq!(clock.now().minute(), 0);

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}

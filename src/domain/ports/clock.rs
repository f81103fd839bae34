//! Clock port.
//!
//! Every "today" decision goes through a [`Clock`] so the reference zone is
//! explicit and tests can pin the date.

use std::sync::Mutex;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, TimeZone, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar day in the reference zone.
    fn today(&self) -> NaiveDate;

    fn yesterday(&self) -> NaiveDate {
        let today = self.today();
        today.checked_sub_days(Days::new(1)).unwrap_or(today)
    }
}

/// Wall clock truncated to days in a fixed reference offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Returns `None` when the offset is outside ±24h.
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self { offset })
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
        self.offset.from_utc_datetime(&Utc::now().naive_utc()).date_naive()
    }
}

/// Clock pinned to a given day. Used by tests and maintenance commands.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn advance_days(&self, days: u64) {
        let mut guard = self.today.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = guard.checked_add_days(Days::new(days)) {
            *guard = next;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.today().and_hms_opt(12, 0, 0).unwrap_or_default().and_utc()
    }

    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_yesterday_and_advance() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(clock.yesterday(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());

        clock.advance_days(2);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(clock.now().date_naive(), clock.today());
    }

    #[test]
    fn test_system_clock_offset_bounds() {
        assert!(SystemClock::with_offset_minutes(0).is_some());
        assert!(SystemClock::with_offset_minutes(14 * 60).is_some());
        assert!(SystemClock::with_offset_minutes(-14 * 60).is_some());
        assert!(SystemClock::with_offset_minutes(25 * 60).is_none());
    }

    #[test]
    fn test_system_clock_offsets_differ_by_at_most_one_day() {
        let east = SystemClock::with_offset_minutes(14 * 60).unwrap().today();
        let west = SystemClock::with_offset_minutes(-12 * 60).unwrap().today();
        let gap = (east - west).num_days();
        assert!((0..=2).contains(&gap));
    }
}

//! Wall-clock access for the stores.
//!
//! The daily rollover and the meal plan seed both depend on the local
//! calendar date, so stores take a [`Clock`] instead of calling
//! `Local::now()` directly.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use std::sync::{Arc, Mutex};

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// Local calendar date at the moment of the call.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep a handle and advance
/// the time seen by a store that owns another clone.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Creates a clock set to noon (local time) on the given date.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(local_noon(date))
    }

    pub fn set(&self, now: DateTime<Local>) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }

    /// Moves the clock to noon on the given date.
    pub fn set_date(&self, date: NaiveDate) {
        self.set(local_noon(date));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn local_noon(date: NaiveDate) -> DateTime<Local> {
    let naive = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_today() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let clock = FixedClock::at_date(date);
        assert_eq!(clock.today(), date);
    }

    #[test]
    fn test_fixed_clock_clones_share_time() {
        let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        let handle = clock.clone();

        let next = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        handle.set_date(next);

        assert_eq!(clock.today(), next);
    }

    #[test]
    fn test_system_clock_is_local() {
        let clock = SystemClock;
        let before = Local::now().date_naive();
        let today = clock.today();
        let after = Local::now().date_naive();
        assert!(today == before || today == after);
    }
}

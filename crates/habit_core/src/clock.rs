use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::day::DateKey;

/// Source of the current local wall-clock time. The store only asks it for
/// "today", so tests can pin the calendar day.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today_key(&self) -> DateKey {
        DateKey::from_instant(self.now())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: NaiveDateTime,
}

impl FixedClock {
    pub fn at(instant: NaiveDateTime) -> Self {
        Self { instant }
    }

    /// Noon on `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self::at(date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)))
    }

    pub fn on_key(day: DateKey) -> Self {
        Self::on(day.date())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let clock = FixedClock::on(date);
        assert_eq!(clock.today_key(), DateKey::from_date(date));
        assert_eq!(clock.now().date(), date);
    }
}

/// Trading calendar: weekend and holiday exclusion
use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;

/// Upper bound on how far `next_trading_day`/`previous_trading_day` search
pub const MAX_CALENDAR_SCAN_DAYS: i64 = 366;

/// Source of market holidays.
///
/// Implementations are asked again on every query, so a calendar backed by a
/// refreshable store is always read fresh.
pub trait HolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Calendar with no holidays; only weekends are closed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn is_holiday(&self, _date: NaiveDate) -> bool {
        false
    }
}

/// Adapter for a plain predicate
#[derive(Clone, Copy)]
pub struct CalendarFn<F>(pub F);

impl<F> HolidayCalendar for CalendarFn<F>
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_holiday(&self, date: NaiveDate) -> bool {
        (self.0)(date)
    }
}

impl HolidayCalendar for HashSet<NaiveDate> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.contains(&date)
    }
}

impl HolidayCalendar for BTreeSet<NaiveDate> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.contains(&date)
    }
}

impl<C: HolidayCalendar + ?Sized> HolidayCalendar for &C {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        (**self).is_holiday(date)
    }
}

impl<C: HolidayCalendar + ?Sized> HolidayCalendar for Arc<C> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        (**self).is_holiday(date)
    }
}

/// Fixed set of holiday dates, usually loaded from config or a JSON file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        HolidaySet {
            dates: dates.into_iter().collect(),
        }
    }

    /// Load a JSON array of `"YYYY-MM-DD"` strings
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let dates: Vec<NaiveDate> = serde_json::from_str(&content)?;
        debug!(
            "Loaded {} holidays from {}",
            dates.len(),
            path.as_ref().display()
        );
        Ok(HolidaySet::from_dates(dates))
    }

    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    pub fn extend<I: IntoIterator<Item = NaiveDate>>(&mut self, dates: I) {
        self.dates.extend(dates);
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.dates.iter()
    }
}

impl HolidayCalendar for HolidaySet {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Check if a date is a trading day (not weekend, not holiday)
pub fn is_trading_day<C: HolidayCalendar + ?Sized>(date: NaiveDate, calendar: &C) -> bool {
    if is_weekend(date) {
        return false;
    }

    !calendar.is_holiday(date)
}

/// Get next trading day strictly after `from_date`
pub fn next_trading_day<C: HolidayCalendar + ?Sized>(
    from_date: NaiveDate,
    calendar: &C,
) -> Option<NaiveDate> {
    scan_trading_day(from_date, TimeDelta::days(1), calendar)
}

/// Get previous trading day strictly before `from_date`
pub fn previous_trading_day<C: HolidayCalendar + ?Sized>(
    from_date: NaiveDate,
    calendar: &C,
) -> Option<NaiveDate> {
    scan_trading_day(from_date, TimeDelta::days(-1), calendar)
}

fn scan_trading_day<C: HolidayCalendar + ?Sized>(
    from_date: NaiveDate,
    step: TimeDelta,
    calendar: &C,
) -> Option<NaiveDate> {
    let mut date = from_date;

    for _ in 0..MAX_CALENDAR_SCAN_DAYS {
        date = date.checked_add_signed(step)?;
        if is_trading_day(date, calendar) {
            return Some(date);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mlk_2021() -> HolidaySet {
        HolidaySet::from_dates([date(2021, 1, 1), date(2021, 1, 18)])
    }

    #[test]
    fn test_holiday_is_not_trading_day() {
        assert!(!is_trading_day(date(2021, 1, 18), &mlk_2021()));
    }

    #[test]
    fn test_weekend() {
        let sat = date(2021, 1, 30);
        let sun = date(2021, 1, 31);
        assert!(!is_trading_day(sat, &NoHolidays));
        assert!(!is_trading_day(sun, &NoHolidays));
    }

    #[test]
    fn test_regular_weekday() {
        assert!(is_trading_day(date(2021, 1, 27), &mlk_2021()));
        // Without the holiday source MLK day is an ordinary Monday
        assert!(is_trading_day(date(2021, 1, 18), &NoHolidays));
    }

    #[test]
    fn test_calendar_is_queried_every_time() {
        use std::cell::Cell;

        let calls = Cell::new(0);
        let calendar = CalendarFn(|_d: NaiveDate| {
            calls.set(calls.get() + 1);
            false
        });

        is_trading_day(date(2021, 1, 27), &calendar);
        is_trading_day(date(2021, 1, 27), &calendar);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_std_sets_and_arc() {
        let hash: HashSet<NaiveDate> = [date(2021, 1, 18)].into_iter().collect();
        let tree: BTreeSet<NaiveDate> = [date(2021, 1, 18)].into_iter().collect();
        let shared = Arc::new(mlk_2021());

        assert!(!is_trading_day(date(2021, 1, 18), &hash));
        assert!(!is_trading_day(date(2021, 1, 18), &tree));
        assert!(!is_trading_day(date(2021, 1, 18), &shared));
    }

    #[test]
    fn test_next_trading_day_skips_weekend_and_holiday() {
        let holidays = mlk_2021();

        // Friday before MLK weekend -> Tuesday
        assert_eq!(
            next_trading_day(date(2021, 1, 15), &holidays),
            Some(date(2021, 1, 19))
        );
        // Tuesday after MLK day -> Friday before it
        assert_eq!(
            previous_trading_day(date(2021, 1, 19), &holidays),
            Some(date(2021, 1, 15))
        );
    }

    #[test]
    fn test_insert_holiday() {
        let mut holidays = HolidaySet::default();
        assert!(holidays.is_empty());

        assert!(holidays.insert(date(2021, 1, 18)));
        assert!(!holidays.insert(date(2021, 1, 18)));
        assert_eq!(holidays.len(), 1);
        assert!(!is_trading_day(date(2021, 1, 18), &holidays));
    }

    #[test]
    fn test_scan_gives_up_on_closed_calendar() {
        let always_closed = CalendarFn(|_d: NaiveDate| true);
        assert_eq!(next_trading_day(date(2021, 1, 27), &always_closed), None);
    }

    #[test]
    fn test_load_holidays_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["2021-01-01", "2021-01-18", "2021-02-15"]"#).unwrap();

        let holidays = HolidaySet::from_json_file(file.path()).unwrap();
        assert_eq!(holidays.len(), 3);
        assert!(holidays.is_holiday(date(2021, 2, 15)));
        assert!(!holidays.is_holiday(date(2021, 2, 16)));
    }

    #[test]
    fn test_load_holidays_rejects_bad_dates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["2021-13-01"]"#).unwrap();

        let err = HolidaySet::from_json_file(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "DATA_001");
    }
}

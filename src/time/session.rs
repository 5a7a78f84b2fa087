/// Market session windows, open predicates and countdowns
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::{Tz, US::Eastern};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{Result, SessionError};
use crate::time::holidays::{self, HolidayCalendar, NoHolidays};
use crate::time::normalize::IntoMarketTime;

const fn hm(hour: u32, min: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, min, 0) {
        Some(time) => time,
        None => panic!("invalid boundary time"),
    }
}

/// Pre-market open: 9:00 AM Eastern
pub const PRE_MARKET_OPEN: NaiveTime = hm(9, 0);
/// Regular open: 9:30 AM Eastern
pub const REGULAR_OPEN: NaiveTime = hm(9, 30);
/// Regular close: 4:00 PM Eastern
pub const REGULAR_CLOSE: NaiveTime = hm(16, 0);
/// Post-market close: 6:00 PM Eastern
pub const POST_MARKET_CLOSE: NaiveTime = hm(18, 0);

/// Default trading timezone
pub const TRADING_TIMEZONE: Tz = Eastern;

/// The four time-of-day boundaries of a trading day.
///
/// Always ordered `pre_market_open < regular_open < regular_close < post_market_close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionBoundaries {
    pre_market_open: NaiveTime,
    regular_open: NaiveTime,
    regular_close: NaiveTime,
    post_market_close: NaiveTime,
}

impl SessionBoundaries {
    pub fn new(
        pre_market_open: NaiveTime,
        regular_open: NaiveTime,
        regular_close: NaiveTime,
        post_market_close: NaiveTime,
    ) -> Result<Self> {
        if !(pre_market_open < regular_open
            && regular_open < regular_close
            && regular_close < post_market_close)
        {
            return Err(SessionError::InvalidBoundaries(format!(
                "expected pre-market open < regular open < regular close < post-market close, got {} / {} / {} / {}",
                pre_market_open, regular_open, regular_close, post_market_close
            )));
        }

        Ok(SessionBoundaries {
            pre_market_open,
            regular_open,
            regular_close,
            post_market_close,
        })
    }

    pub fn pre_market_open(&self) -> NaiveTime {
        self.pre_market_open
    }

    pub fn regular_open(&self) -> NaiveTime {
        self.regular_open
    }

    pub fn regular_close(&self) -> NaiveTime {
        self.regular_close
    }

    pub fn post_market_close(&self) -> NaiveTime {
        self.post_market_close
    }

    /// `[regular_open, regular_close]`
    pub fn in_regular(&self, time: NaiveTime) -> bool {
        self.regular_open <= time && time <= self.regular_close
    }

    /// `[pre_market_open, post_market_close]`
    pub fn in_extended(&self, time: NaiveTime) -> bool {
        self.pre_market_open <= time && time <= self.post_market_close
    }

    /// `[pre_market_open, regular_open)`
    pub fn in_pre_market(&self, time: NaiveTime) -> bool {
        self.pre_market_open <= time && time < self.regular_open
    }

    /// `(regular_close, post_market_close]`
    pub fn in_post_market(&self, time: NaiveTime) -> bool {
        self.regular_close < time && time <= self.post_market_close
    }

    /// `[pre_market_open, regular_close]`
    pub fn in_pre_extended(&self, time: NaiveTime) -> bool {
        self.pre_market_open <= time && time <= self.regular_close
    }

    /// `[regular_open, post_market_close]`
    pub fn in_post_extended(&self, time: NaiveTime) -> bool {
        self.regular_open <= time && time <= self.post_market_close
    }
}

impl Default for SessionBoundaries {
    fn default() -> Self {
        SessionBoundaries {
            pre_market_open: PRE_MARKET_OPEN,
            regular_open: REGULAR_OPEN,
            regular_close: REGULAR_CLOSE,
            post_market_close: POST_MARKET_CLOSE,
        }
    }
}

/// Sub-window of the trading day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    PreMarket,
    Regular,
    PostMarket,
    Closed,
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Window::PreMarket => "pre-market",
            Window::Regular => "regular",
            Window::PostMarket => "post-market",
            Window::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// Result of a countdown query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Signed time left until the boundary
    Remaining(TimeDelta),
    /// The session asked about is not open; maximal sentinel
    NotApplicable,
    /// The boundary has already been reached; minimal sentinel
    Reached,
}

impl Countdown {
    /// Collapse into a plain duration, mapping the sentinels to
    /// `TimeDelta::MAX` and `TimeDelta::MIN`
    pub fn as_duration(&self) -> TimeDelta {
        match self {
            Countdown::Remaining(delta) => *delta,
            Countdown::NotApplicable => TimeDelta::MAX,
            Countdown::Reached => TimeDelta::MIN,
        }
    }

    pub fn remaining(&self) -> Option<TimeDelta> {
        match self {
            Countdown::Remaining(delta) => Some(*delta),
            _ => None,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Remaining(delta) => {
                let sign = if *delta < TimeDelta::zero() { "-" } else { "" };
                let secs = delta.num_seconds().abs();
                write!(f, "{}{}h{:02}m{:02}s", sign, secs / 3600, (secs % 3600) / 60, secs % 60)
            }
            Countdown::NotApplicable => f.write_str("n/a"),
            Countdown::Reached => f.write_str("reached"),
        }
    }
}

/// Boundary instants of one trading day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimes {
    pub date: NaiveDate,
    pub pre_market_open: DateTime<Tz>,
    pub regular_open: DateTime<Tz>,
    pub regular_close: DateTime<Tz>,
    pub post_market_close: DateTime<Tz>,
}

/// Evaluates session state for timestamps in a fixed trading timezone.
///
/// Holds only immutable data plus the injected holiday calendar, so it can be
/// shared freely across threads when the calendar can.
#[derive(Debug, Clone)]
pub struct MarketSession<C = NoHolidays> {
    tz: Tz,
    boundaries: SessionBoundaries,
    calendar: C,
}

impl MarketSession<NoHolidays> {
    /// US Eastern session with default boundaries and weekend-only closures
    pub fn weekdays_only() -> Self {
        MarketSession::us_equities(NoHolidays)
    }
}

impl<C: HolidayCalendar> MarketSession<C> {
    pub fn new(tz: Tz, boundaries: SessionBoundaries, calendar: C) -> Self {
        MarketSession {
            tz,
            boundaries,
            calendar,
        }
    }

    /// US Eastern session with default boundaries
    pub fn us_equities(calendar: C) -> Self {
        MarketSession::new(TRADING_TIMEZONE, SessionBoundaries::default(), calendar)
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn boundaries(&self) -> &SessionBoundaries {
        &self.boundaries
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Express a naive or zone-aware timestamp in the trading timezone
    pub fn normalize<T: IntoMarketTime>(&self, timestamp: T) -> Result<DateTime<Tz>> {
        timestamp.into_market_time(self.tz)
    }

    /// Current time in the trading timezone
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        holidays::is_trading_day(date, &self.calendar)
    }

    pub fn next_trading_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        holidays::next_trading_day(date, &self.calendar)
    }

    pub fn previous_trading_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        holidays::previous_trading_day(date, &self.calendar)
    }

    // ---- Open predicates (calendar aware) ----

    pub fn is_market_open<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> bool {
        let (date, time) = self.local_parts(timestamp);
        self.is_trading_day(date) && self.boundaries.in_regular(time)
    }

    pub fn is_extended_hours_market_open<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> bool {
        let (date, time) = self.local_parts(timestamp);
        self.is_trading_day(date) && self.boundaries.in_extended(time)
    }

    // ---- Time-of-day windows (calendar ignored) ----

    pub fn in_market_time_window<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> bool {
        self.boundaries.in_regular(self.local_time(timestamp))
    }

    pub fn in_extended_hours_market_time_window<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> bool {
        self.boundaries.in_extended(self.local_time(timestamp))
    }

    pub fn in_pre_market_time_window<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> bool {
        self.boundaries.in_pre_market(self.local_time(timestamp))
    }

    pub fn in_post_market_time_window<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> bool {
        self.boundaries.in_post_market(self.local_time(timestamp))
    }

    pub fn in_pre_extended_hours_market_time_window<Z: TimeZone>(
        &self,
        timestamp: &DateTime<Z>,
    ) -> bool {
        self.boundaries.in_pre_extended(self.local_time(timestamp))
    }

    pub fn in_post_extended_hours_market_time_window<Z: TimeZone>(
        &self,
        timestamp: &DateTime<Z>,
    ) -> bool {
        self.boundaries.in_post_extended(self.local_time(timestamp))
    }

    /// Which sub-window of the trading day `timestamp` falls in
    pub fn window<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> Window {
        let (date, time) = self.local_parts(timestamp);

        if !self.is_trading_day(date) {
            return Window::Closed;
        }

        if self.boundaries.in_pre_market(time) {
            Window::PreMarket
        } else if self.boundaries.in_regular(time) {
            Window::Regular
        } else if self.boundaries.in_post_market(time) {
            Window::PostMarket
        } else {
            Window::Closed
        }
    }

    /// Boundary instants for `date`, or `None` if it is not a trading day
    pub fn session_times(&self, date: NaiveDate) -> Option<SessionTimes> {
        if !self.is_trading_day(date) {
            return None;
        }

        Some(SessionTimes {
            date,
            pre_market_open: self.instant_on(date, self.boundaries.pre_market_open)?,
            regular_open: self.instant_on(date, self.boundaries.regular_open)?,
            regular_close: self.instant_on(date, self.boundaries.regular_close)?,
            post_market_close: self.instant_on(date, self.boundaries.post_market_close)?,
        })
    }

    // ---- Countdowns ----

    /// Time left in the regular session, `NotApplicable` if it is not open
    pub fn time_til_regular_close<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> Countdown {
        if !self.is_market_open(timestamp) {
            return Countdown::NotApplicable;
        }
        self.countdown_to(timestamp, self.boundaries.regular_close)
    }

    /// Time left in extended hours, `NotApplicable` if they are not open
    pub fn time_til_extended_close<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> Countdown {
        if !self.is_extended_hours_market_open(timestamp) {
            return Countdown::NotApplicable;
        }
        self.countdown_to(timestamp, self.boundaries.post_market_close)
    }

    /// Time until today's regular open, `Reached` once a trading day is past it
    pub fn time_til_regular_open<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> Countdown {
        self.countdown_to_open(timestamp, self.boundaries.regular_open)
    }

    /// Time until today's pre-market open, `Reached` once a trading day is past it
    pub fn time_til_extended_open<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> Countdown {
        self.countdown_to_open(timestamp, self.boundaries.pre_market_open)
    }

    /// Next regular open strictly after `timestamp`
    pub fn next_regular_open<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> Option<DateTime<Tz>> {
        let local = timestamp.with_timezone(&self.tz);
        let (date, time) = (local.date_naive(), local.naive_local().time());

        let open_date = if self.is_trading_day(date) && time < self.boundaries.regular_open {
            date
        } else {
            self.next_trading_day(date)?
        };

        self.instant_on(open_date, self.boundaries.regular_open)
    }

    fn countdown_to_open<Z: TimeZone>(&self, timestamp: &DateTime<Z>, open: NaiveTime) -> Countdown {
        let (date, time) = self.local_parts(timestamp);

        if self.is_trading_day(date) && time >= open {
            return Countdown::Reached;
        }
        self.countdown_to(timestamp, open)
    }

    fn countdown_to<Z: TimeZone>(&self, timestamp: &DateTime<Z>, boundary: NaiveTime) -> Countdown {
        let local = timestamp.with_timezone(&self.tz);

        match self.instant_on(local.date_naive(), boundary) {
            Some(target) => {
                let remaining = target - local;
                debug!("{} until {} on {}", remaining, boundary, target.date_naive());
                Countdown::Remaining(remaining)
            }
            None => Countdown::NotApplicable,
        }
    }

    /// Instant at `time` on `date` in the trading zone
    fn instant_on(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
        let instant = self.tz.from_local_datetime(&date.and_time(time)).earliest();
        if instant.is_none() {
            warn!("Boundary {} does not exist on {} in {}", time, date, self.tz);
        }
        instant
    }

    fn local_parts<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> (NaiveDate, NaiveTime) {
        let local = timestamp.with_timezone(&self.tz);
        (local.date_naive(), local.naive_local().time())
    }

    fn local_time<Z: TimeZone>(&self, timestamp: &DateTime<Z>) -> NaiveTime {
        timestamp.with_timezone(&self.tz).naive_local().time()
    }
}

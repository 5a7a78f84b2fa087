pub mod holidays;
pub mod normalize;
pub mod session;

pub use holidays::{
    is_trading_day, next_trading_day, previous_trading_day, CalendarFn, HolidayCalendar,
    HolidaySet, NoHolidays,
};
pub use normalize::{normalize, parse_timestamp, IntoMarketTime};
pub use session::{
    Countdown, MarketSession, SessionBoundaries, SessionTimes, Window, POST_MARKET_CLOSE,
    PRE_MARKET_OPEN, REGULAR_CLOSE, REGULAR_OPEN, TRADING_TIMEZONE,
};

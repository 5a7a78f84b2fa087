/// Timestamp normalization into the trading timezone
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{Result, SessionError};

/// Naive formats accepted by `parse_timestamp`, most specific first
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A timestamp that can be expressed in the trading timezone.
///
/// Naive values are read as wall-clock time already in the trading zone and
/// only get the zone attached. Zone-aware values are converted, which shifts
/// the clock value by the offset difference.
pub trait IntoMarketTime {
    fn into_market_time(self, tz: Tz) -> Result<DateTime<Tz>>;
}

impl IntoMarketTime for NaiveDateTime {
    fn into_market_time(self, tz: Tz) -> Result<DateTime<Tz>> {
        match tz.from_local_datetime(&self) {
            LocalResult::Single(dt) => Ok(dt),
            // Fall-back overlap: take the standard-time reading
            LocalResult::Ambiguous(_, standard) => {
                debug!("Ambiguous wall time {} in {}, using {}", self, tz, standard);
                Ok(standard)
            }
            LocalResult::None => Err(SessionError::InvalidTimestamp(format!(
                "{} does not exist in {}",
                self, tz
            ))),
        }
    }
}

impl<Z: TimeZone> IntoMarketTime for DateTime<Z> {
    fn into_market_time(self, tz: Tz) -> Result<DateTime<Tz>> {
        Ok(self.with_timezone(&tz))
    }
}

/// Express any timestamp in the trading timezone
pub fn normalize<T: IntoMarketTime>(timestamp: T, tz: Tz) -> Result<DateTime<Tz>> {
    timestamp.into_market_time(tz)
}

/// Parse a timestamp string and normalize it.
///
/// RFC 3339 strings carry an offset and are converted; the naive forms
/// (`YYYY-MM-DD HH:MM[:SS]`, optionally with a `T` separator) are attached.
pub fn parse_timestamp(input: &str, tz: Tz) -> Result<DateTime<Tz>> {
    let input = input.trim();

    if let Ok(aware) = DateTime::parse_from_rfc3339(input) {
        return normalize(aware, tz);
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return normalize(naive, tz);
        }
    }

    Err(SessionError::InvalidTimestamp(format!(
        "cannot parse '{}' as a timestamp",
        input
    )))
}

pub mod loader;

pub use loader::{load_config, parse_time};

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{Result, SessionError};
use crate::time::{HolidaySet, MarketSession, SessionBoundaries};

/// Market session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    // Trading Timezone (IANA name)
    pub timezone: String,

    // Boundary Times ("HH:MM" or "HH:MM:SS")
    pub pre_market_open: String,
    pub regular_open: String,
    pub regular_close: String,
    pub post_market_close: String,

    // Holiday Calendar
    pub holidays: Vec<NaiveDate>,
    pub holidays_file: Option<PathBuf>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            timezone: "America/New_York".to_string(),
            pre_market_open: "09:00".to_string(),
            regular_open: "09:30".to_string(),
            regular_close: "16:00".to_string(),
            post_market_close: "18:00".to_string(),
            holidays: Vec::new(),
            holidays_file: None,
        }
    }
}

impl MarketConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| SessionError::UnknownTimezone(self.timezone.clone()))
    }

    pub fn boundaries(&self) -> Result<SessionBoundaries> {
        SessionBoundaries::new(
            parse_time("pre_market_open", &self.pre_market_open)?,
            parse_time("regular_open", &self.regular_open)?,
            parse_time("regular_close", &self.regular_close)?,
            parse_time("post_market_close", &self.post_market_close)?,
        )
    }

    /// Inline holidays merged with the optional holiday file
    pub fn holiday_set(&self) -> Result<HolidaySet> {
        let mut holidays = HolidaySet::from_dates(self.holidays.iter().copied());

        if let Some(path) = &self.holidays_file {
            let from_file = HolidaySet::from_json_file(path)?;
            holidays.extend(from_file.iter().copied());
        }

        if holidays.is_empty() {
            warn!("No holidays configured, only weekends will be closed");
        }

        Ok(holidays)
    }

    /// Build the evaluator described by this config
    pub fn build_session(&self) -> Result<MarketSession<HolidaySet>> {
        let tz = self.timezone()?;
        let boundaries = self.boundaries()?;
        let holidays = self.holiday_set()?;

        info!(
            "Market session: {} pre {} / open {} / close {} / post {} ({} holidays)",
            tz,
            boundaries.pre_market_open(),
            boundaries.regular_open(),
            boundaries.regular_close(),
            boundaries.post_market_close(),
            holidays.len()
        );

        Ok(MarketSession::new(tz, boundaries, holidays))
    }
}

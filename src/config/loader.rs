/// Configuration loading from TOML file
use chrono::NaiveTime;
use std::path::Path;

use crate::config::MarketConfig;
use crate::error::{Result, SessionError};

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MarketConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SessionError::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: MarketConfig = toml::from_str(&content)
        .map_err(|e| SessionError::ConfigError(format!("Failed to parse config: {}", e)))?;

    // Validate config
    validate_config(&config)?;

    Ok(config)
}

/// Parse a boundary time given as "HH:MM:SS" or "HH:MM"
pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| SessionError::InvalidParameter(format!("{}: '{}' is not a time of day", field, value)))
}

fn validate_config(config: &MarketConfig) -> Result<()> {
    // Validate timezone
    if config.timezone.is_empty() {
        return Err(SessionError::ConfigError("timezone is empty".to_string()));
    }
    config.timezone()?;

    // Validate boundary times and their ordering
    config.boundaries()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", body).unwrap();
        file
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.timezone, "America/New_York");
        assert_eq!(config.boundaries().unwrap(), crate::time::SessionBoundaries::default());
        assert!(config.holidays.is_empty());
    }

    #[test]
    fn test_full_config() {
        let file = write_config(
            r#"
timezone = "US/Eastern"
pre_market_open = "07:00"
regular_open = "09:30:00"
regular_close = "16:00"
post_market_close = "20:00"
holidays = ["2021-01-01", "2021-01-18"]
"#,
        );
        let config = load_config(file.path()).unwrap();
        let session = config.build_session().unwrap();

        assert_eq!(session.boundaries().pre_market_open(), parse_time("t", "07:00").unwrap());
        assert_eq!(session.boundaries().post_market_close(), parse_time("t", "20:00").unwrap());
        assert!(!session.is_trading_day(NaiveDate::from_ymd_opt(2021, 1, 18).unwrap()));
    }

    #[test]
    fn test_holidays_file_is_merged() {
        let mut holidays = tempfile::NamedTempFile::new().unwrap();
        write!(holidays, r#"["2021-02-15"]"#).unwrap();

        let file = write_config(&format!(
            "holidays = [\"2021-01-18\"]\nholidays_file = {:?}\n",
            holidays.path().display().to_string()
        ));
        let session = load_config(file.path()).unwrap().build_session().unwrap();

        assert_eq!(session.calendar().len(), 2);
        assert!(!session.is_trading_day(NaiveDate::from_ymd_opt(2021, 2, 15).unwrap()));
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let file = write_config("timezone = \"Mars/Olympus_Mons\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "TIME_003");
    }

    #[test]
    fn test_unordered_boundaries_rejected() {
        let file = write_config("regular_open = \"17:00\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "TIME_002");
    }

    #[test]
    fn test_bad_time_rejected() {
        let file = write_config("regular_close = \"4pm\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "CFG_002");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/marketclock.toml").unwrap_err();
        assert_eq!(err.error_code(), "CFG_001");
    }
}

/// Print the market session status for a timestamp (defaults to now)
///
/// Usage: marketclock [config.toml] [timestamp]
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use marketclock::{load_config, parse_timestamp, HolidayCalendar, MarketConfig, MarketSession};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marketclock=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let timestamp_arg = args.next();

    let config = if Path::new(&config_path).exists() {
        load_config(&config_path).with_context(|| format!("loading {}", config_path))?
    } else {
        warn!("Config {} not found, using US Eastern defaults", config_path);
        MarketConfig::default()
    };
    let session = config.build_session()?;

    let now = match timestamp_arg {
        Some(raw) => parse_timestamp(&raw, session.timezone())
            .with_context(|| format!("parsing timestamp '{}'", raw))?,
        None => session.now(),
    };
    info!("Evaluating {}", now.to_rfc3339());

    print_status(&session, &now);

    Ok(())
}

fn print_status<C: HolidayCalendar>(session: &MarketSession<C>, now: &chrono::DateTime<chrono_tz::Tz>) {
    let date = now.date_naive();

    println!("Market Session Status");
    println!("=====================\n");
    println!("Time:         {} ({})", now.format("%Y-%m-%d %H:%M:%S %Z"), session.timezone());
    println!("Trading day:  {}", session.is_trading_day(date));
    println!("Window:       {}", session.window(now));
    println!("Regular open: {}", session.is_market_open(now));
    println!("Extended:     {}", session.is_extended_hours_market_open(now));

    println!("\nCountdowns:");
    println!("   til extended open:  {}", session.time_til_extended_open(now));
    println!("   til regular open:   {}", session.time_til_regular_open(now));
    println!("   til regular close:  {}", session.time_til_regular_close(now));
    println!("   til extended close: {}", session.time_til_extended_close(now));

    if let Some(next_open) = session.next_regular_open(now) {
        println!("\nNext regular open: {}", next_open.format("%a %Y-%m-%d %H:%M %Z"));
    }

    if let Some(times) = session.session_times(date) {
        println!(
            "Today: pre {} | open {} | close {} | post {}",
            times.pre_market_open.format("%H:%M"),
            times.regular_open.format("%H:%M"),
            times.regular_close.format("%H:%M"),
            times.post_market_close.format("%H:%M"),
        );
    }
}

pub mod config;
pub mod error;
pub mod time;

pub use config::{load_config, MarketConfig};
pub use error::{Result, SessionError};
pub use time::*;

/// Centralized error types for the session evaluator
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    // Time Errors
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid session boundaries: {0}")]
    InvalidBoundaries(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // File I/O Errors
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Deserialization failed: {0}")]
    DeserializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

impl SessionError {
    /// Get error code for logging/monitoring
    pub fn error_code(&self) -> &str {
        match self {
            SessionError::InvalidTimestamp(_) => "TIME_001",
            SessionError::InvalidBoundaries(_) => "TIME_002",
            SessionError::UnknownTimezone(_) => "TIME_003",
            SessionError::ConfigError(_) => "CFG_001",
            SessionError::InvalidParameter(_) => "CFG_002",
            SessionError::FileError(_) => "FILE_001",
            SessionError::DeserializationError(_) => "DATA_001",
        }
    }

    /// Check if the error came from a bad input value rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidTimestamp(_)
                | SessionError::InvalidBoundaries(_)
                | SessionError::UnknownTimezone(_)
                | SessionError::InvalidParameter(_)
        )
    }
}

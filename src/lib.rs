//! SS-Utilities
//!
//! Small, independent helpers: error statistics for forecasts, time and
//! numeric conversions, console widgets, a file scanner and e-mail alerts.

use std::fmt;

pub mod config;
pub mod console;
pub mod email;
pub mod log_file;
pub mod scan;
pub mod stats;
pub mod util;

// Common error types
#[derive(Debug)]
pub enum SsError {
    /// I/O operation failed
    IoError(std::io::Error),
    /// Configuration validation or parsing error
    ConfigError(String),
    /// Caller supplied arguments that cannot be used
    InvalidInput(String),
    /// Input is well-formed but the statistic is undefined for it
    DegenerateData(String),
    /// Anticipated failure raised by callers, optionally tagged with a message id
    Anticipated(String),
    /// User aborted an interactive prompt
    Cancelled(String),
    /// Serialising or writing results failed
    PersistenceError(String),
    /// Building or sending an e-mail failed
    EmailError(String),
}

impl fmt::Display for SsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SsError::IoError(err) => write!(f, "I/O error: {}", err),
            SsError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            SsError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            SsError::DegenerateData(msg) => write!(f, "Degenerate data: {}", msg),
            SsError::Anticipated(msg) => write!(f, "{}", msg),
            SsError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            SsError::PersistenceError(msg) => write!(f, "Results persistence error: {}", msg),
            SsError::EmailError(msg) => write!(f, "E-mail error: {}", msg),
        }
    }
}

impl std::error::Error for SsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SsError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SsError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => {
                SsError::Cancelled(format!("Input closed: {}", err))
            }
            _ => SsError::IoError(err),
        }
    }
}

impl From<serde_json::Error> for SsError {
    fn from(err: serde_json::Error) -> Self {
        SsError::PersistenceError(format!("JSON serialization error: {}", err))
    }
}

impl From<toml::de::Error> for SsError {
    fn from(err: toml::de::Error) -> Self {
        SsError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for SsError {
    fn from(err: toml::ser::Error) -> Self {
        SsError::ConfigError(format!("TOML serialization error: {}", err))
    }
}

/// Result type alias for SS-Utilities operations
pub type Result<T> = std::result::Result<T, SsError>;

/// Error handling utilities
pub mod error {
    use super::SsError;
    use crate::log_file::ErrorLog;
    use std::fmt::Debug;

    /// Build an anticipated error.
    ///
    /// The message reads `"{msg_id}: {msg}"` when an id is given, and the
    /// debug form of `cause` is appended on an indented second line. When
    /// `log` is supplied the final message is also appended to that log file;
    /// a failure to write the log is reported with `log::warn!` and does not
    /// replace the error being built.
    pub fn anticipated(
        msg: &str,
        msg_id: Option<&str>,
        cause: Option<&dyn Debug>,
        log: Option<&ErrorLog>,
    ) -> SsError {
        let mut text = match msg_id {
            Some(id) => format!("{}: {}", id, msg),
            None => msg.to_string(),
        };
        if let Some(cause) = cause {
            text.push_str(&format!("\n    {:?}", cause));
        }
        if let Some(logger) = log {
            if let Err(err) = logger.write_to_log(&text) {
                log::warn!("could not record error to {}: {}", logger.path().display(), err);
            }
        }
        SsError::Anticipated(text)
    }

    /// Convert error to user-friendly message with suggestions
    pub fn user_friendly_message(error: &SsError) -> String {
        match error {
            SsError::InvalidInput(msg) => {
                format!("Invalid input: {}. Check the values you passed.", msg)
            }
            SsError::DegenerateData(msg) => {
                format!("Cannot compute statistic: {}. The data has no spread.", msg)
            }
            SsError::ConfigError(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            SsError::PersistenceError(_) => {
                "Failed to write results. Check disk space and permissions.".to_string()
            }
            SsError::EmailError(msg) => {
                format!("Could not send e-mail: {}. Check the [smtp] settings.", msg)
            }
            SsError::Cancelled(_) => "Operation was cancelled by user.".to_string(),
            SsError::IoError(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                "Permission denied. Check file permissions.".to_string()
            }
            _ => error.to_string(),
        }
    }
}

// Common types and constants
pub const APP_NAME: &str = "ss-utilities";
pub const CONFIG_FILE: &str = "ss-utilities.toml";
pub const DEFAULT_ROUND_BASE: u32 = 5;

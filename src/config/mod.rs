//! Configuration management module
//!
//! Handles loading, saving, and validation of user preferences for the
//! console helpers and the file scanner.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::console::{ChartOptions, ProgressLayout};
use crate::email::SmtpConfig;
use crate::log_file::ErrorLog;
use crate::{SsError, Result, APP_NAME, CONFIG_FILE};

/// User preferences; missing keys in the file take their default values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilsConfig {
    /// Width of ASCII bar charts in characters
    pub chart_width: usize,
    /// Character used to draw chart bars
    pub bar_char: char,
    /// Width of the text progress bar
    pub progress_bar_length: usize,
    /// Decimals shown in progress percentages
    pub progress_decimals: usize,
    /// Extensions scanned when none are given on the command line
    pub default_extensions: Vec<String>,
    /// Optional file that anticipated errors are recorded to
    pub error_log: Option<PathBuf>,
    /// SMTP account for e-mail alerts
    pub smtp: Option<SmtpConfig>,
}

impl Default for UtilsConfig {
    fn default() -> Self {
        Self {
            chart_width: 100,
            bar_char: '#',
            progress_bar_length: 100,
            progress_decimals: 2,
            default_extensions: vec!["*".to_string()],
            error_log: None,
            smtp: None,
        }
    }
}

impl UtilsConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.chart_width == 0 {
            return Err(SsError::ConfigError(
                "Chart width must be greater than 0".to_string()
            ));
        }

        if self.progress_bar_length == 0 {
            return Err(SsError::ConfigError(
                "Progress bar length must be greater than 0".to_string()
            ));
        }

        const MAX_DECIMALS: usize = 10;
        if self.progress_decimals > MAX_DECIMALS {
            return Err(SsError::ConfigError(
                format!("Too many progress decimals: {} (max: {})",
                    self.progress_decimals, MAX_DECIMALS)
            ));
        }

        if self.bar_char.is_whitespace() || self.bar_char.is_control() {
            return Err(SsError::ConfigError(
                "Bar character must be visible".to_string()
            ));
        }

        if self.default_extensions.is_empty() {
            return Err(SsError::ConfigError(
                "At least one default extension is required".to_string()
            ));
        }

        if let Some(bad) = self.default_extensions.iter().find(|e| e.is_empty() || e.contains('/')) {
            return Err(SsError::ConfigError(
                format!("Invalid default extension: '{}'", bad)
            ));
        }

        if let Some(smtp) = &self.smtp {
            smtp.validate()?;
        }

        Ok(())
    }

    /// Set the chart width
    pub fn with_chart_width(mut self, width: usize) -> Self {
        self.chart_width = width;
        self
    }

    /// Set the chart bar character
    pub fn with_bar_char(mut self, bar_char: char) -> Self {
        self.bar_char = bar_char;
        self
    }

    /// Set the progress bar length
    pub fn with_progress_bar_length(mut self, length: usize) -> Self {
        self.progress_bar_length = length;
        self
    }

    /// Set the default scan extensions
    pub fn with_default_extensions(mut self, extensions: Vec<String>) -> Self {
        self.default_extensions = extensions;
        self
    }

    /// Set the error log file
    pub fn with_error_log(mut self, path: PathBuf) -> Self {
        self.error_log = Some(path);
        self
    }

    /// Set the SMTP account
    pub fn with_smtp(mut self, smtp: SmtpConfig) -> Self {
        self.smtp = Some(smtp);
        self
    }

    /// Chart options carrying the configured width and bar character
    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions::new()
            .with_max_width(self.chart_width)
            .with_bar_char(self.bar_char)
    }

    /// Progress layout carrying the configured length and decimals
    pub fn progress_layout(&self) -> ProgressLayout {
        ProgressLayout::new()
            .with_bar_length(self.progress_bar_length)
            .with_decimals(self.progress_decimals)
    }

    /// Error log for the configured file, if any
    pub fn error_logger(&self) -> Option<ErrorLog> {
        self.error_log.as_ref().map(|path| ErrorLog::new(path.clone()))
    }

    /// Load configuration from the standard config file location
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from `path`, or defaults if it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            log::debug!("no config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .map_err(|e| SsError::ConfigError(
                format!("Failed to read config file {}: {}", config_path.display(), e)
            ))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| SsError::ConfigError(
                format!("Failed to parse config file {}: {}", config_path.display(), e)
            ))?;

        // Validate the loaded configuration
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the standard config file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save configuration to `path`, creating its directory if needed
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Validate before saving
        self.validate()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SsError::ConfigError(
                    format!("Failed to create config directory {}: {}", parent.display(), e)
                ))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SsError::ConfigError(
                format!("Failed to serialize configuration: {}", e)
            ))?;

        fs::write(config_path, content)
            .map_err(|e| SsError::ConfigError(
                format!("Failed to write config file {}: {}", config_path.display(), e)
            ))?;

        Ok(())
    }

    /// Get the standard configuration file path
    /// Uses $CONFIG_HOME/ss-utilities/ss-utilities.toml
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SsError::ConfigError(
                "Unable to determine config directory".to_string()
            ))?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

//! Runtime configuration for timeline core and its hosts.
//!
//! # Responsibility
//! - Deserialize host-provided JSON configuration with defaults for every field.
//! - Validate import options before they reach the parser.
//!
//! # Invariants
//! - `TimelineConfig::default()` is always valid.
//! - A loaded config is validated before it is returned.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const DEFAULT_TITLE_MAX_CHARS: usize = 40;
const DEFAULT_CLOCK: &str = "00:00";
const CLOCK_FORMAT: &str = "%H:%M";

/// Configuration loading and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Import parser options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Maximum characters kept when deriving a title from the first content line.
    pub title_max_chars: usize,
    /// Drop date blocks that have no content instead of importing them.
    pub skip_empty_blocks: bool,
    /// `HH:MM` stamped on date lines with neither period nor explicit time.
    pub default_time: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            skip_empty_blocks: false,
            default_time: DEFAULT_CLOCK.to_string(),
        }
    }
}

impl ImportConfig {
    /// Parses `default_time` as `HH:MM`.
    pub fn default_clock(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.default_time.trim(), CLOCK_FORMAT).map_err(|_| {
            ConfigError::Invalid(format!(
                "default_time must be HH:MM, got `{}`",
                self.default_time
            ))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title_max_chars == 0 {
            return Err(ConfigError::Invalid(
                "title_max_chars must be greater than zero".to_string(),
            ));
        }
        self.default_clock()?;
        Ok(())
    }
}

/// Top-level configuration consumed by hosts (CLI, embedding apps).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// `trace|debug|info|warn|error`; build-mode default when absent.
    pub log_level: Option<String>,
    /// Absolute log directory; file logging stays off when absent.
    pub log_dir: Option<String>,
    pub import: ImportConfig,
}

impl TimelineConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.import.validate()
    }

    /// Effective log level: configured value or the build-mode default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or_else(|| crate::logging::default_log_level())
    }
}

/// Reads and validates a JSON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<TimelineConfig, ConfigError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    TimelineConfig::from_json_str(&raw)
}

//! Configuration management for edaa-reports.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `edaa-reports.toml` file
//! 3. User config `~/.config/edaa-reports/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reading and converting reports.
    pub reader: ReaderConfig,

    /// Writing reports.
    pub writer: WriterConfig,

    /// Merged summaries.
    pub summary: SummaryConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./edaa-reports.toml` (project local)
    /// 2. `~/.config/edaa-reports/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(PROJECT_CONFIG_FILE).exists() {
            return Self::from_file(PROJECT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Some(strict) = env_flag("EDAA_REPORTS_STRICT") {
            self.reader.strict_aggregation = strict;
        }
        if let Some(overwrite) = env_flag("EDAA_REPORTS_OVERWRITE") {
            self.writer.overwrite = overwrite;
        }
        if let Ok(indent) = std::env::var("EDAA_REPORTS_INDENT") {
            if let Ok(n) = indent.parse() {
                self.writer.indent = n;
            }
        }
        if let Ok(precision) = std::env::var("EDAA_REPORTS_TIME_PRECISION") {
            if let Ok(n) = precision.parse() {
                self.writer.time_precision = n;
            }
        }
        if let Ok(name) = std::env::var("EDAA_REPORTS_SUMMARY_NAME") {
            self.summary.name = name;
        }
    }

    /// Reject values no writer can honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.writer.time_precision > 9 {
            return Err(ConfigError::Invalid(format!(
                "writer.time_precision must be at most 9, got {}",
                self.writer.time_precision
            )));
        }
        if self.summary.name.trim().is_empty() {
            return Err(ConfigError::Invalid("summary.name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Reading and converting reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Fail on inconsistent stored durations and counts instead of repairing them.
    pub strict_aggregation: bool,

    /// JUnit: build the hierarchy from the classname alone.
    pub decouple_classname_hierarchy: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            strict_aggregation: DEFAULT_STRICT_AGGREGATION,
            decouple_classname_hierarchy: DEFAULT_DECOUPLE_CLASSNAME_HIERARCHY,
        }
    }
}

/// Writing reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Replace existing files.
    pub overwrite: bool,

    /// XML indentation in spaces, 0 for single-line output.
    pub indent: usize,

    /// Decimals of `time` attributes.
    pub time_precision: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            overwrite: DEFAULT_OVERWRITE,
            indent: DEFAULT_INDENT,
            time_precision: DEFAULT_TIME_PRECISION,
        }
    }
}

/// Merged summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub name: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SUMMARY_NAME.to_string(),
        }
    }
}

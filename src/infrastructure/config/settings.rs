//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; the Telegram bot token comes from
//! the `TELEGRAM_BOT_TOKEN` environment variable only.
//!
//! # Example
//!
//! ```no_run
//! use pricewatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::service::{AggregatorSettings, CheckerSettings};
use super::source::SourcesConfig;
use super::telegram::TelegramAppConfig;
use crate::adapter::outbound::source::http::{render_url, QUERY_PLACEHOLDER};
use crate::domain::SourceId;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional; an empty file yields a stub-only setup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Background checker cadence.
    #[serde(default)]
    pub checker: CheckerSettings,

    /// Aggregation timeouts, fallback and diagnostics.
    #[serde(default)]
    pub aggregator: AggregatorSettings,

    /// Offer sources.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Telegram front-end.
    #[serde(default)]
    pub telegram: TelegramAppConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if !self.logging.is_known_format() {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected \"pretty\" or \"json\", got {:?}", self.logging.format),
            }
            .into());
        }
        if self.checker.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "checker.interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.aggregator.source_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "aggregator.source_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.aggregator.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                field: "aggregator.max_results",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let mut names = HashSet::new();
        for source in &self.sources.http {
            let name = source.name.trim();
            if name.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "sources.http.name",
                }
                .into());
            }
            if name == SourceId::STUB || name == SourceId::FALLBACK {
                return Err(ConfigError::InvalidValue {
                    field: "sources.http.name",
                    reason: format!("`{name}` is reserved"),
                }
                .into());
            }
            if !names.insert(name) {
                return Err(ConfigError::InvalidValue {
                    field: "sources.http.name",
                    reason: format!("duplicate source `{name}`"),
                }
                .into());
            }
            if !source.url.contains(QUERY_PLACEHOLDER) {
                return Err(ConfigError::InvalidValue {
                    field: "sources.http.url",
                    reason: format!("`{name}` url must contain {QUERY_PLACEHOLDER}"),
                }
                .into());
            }
            if let Err(e) = render_url(&source.url, "test") {
                return Err(ConfigError::InvalidValue {
                    field: "sources.http.url",
                    reason: format!("`{name}`: {e}"),
                }
                .into());
            }
            if source.timeout_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "sources.http.timeout_ms",
                    reason: format!("`{name}` timeout must be greater than 0"),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

//! Checker and aggregator settings.

use std::time::Duration;

use serde::Deserialize;

use crate::application::{AggregatorConfig, CheckerConfig};

const fn default_true() -> bool {
    true
}

const fn default_interval_secs() -> u64 {
    90
}

const fn default_source_timeout_ms() -> u64 {
    15_000
}

const fn default_max_results() -> usize {
    10
}

/// Background checker settings (`[checker]`).
#[derive(Debug, Clone, Deserialize)]
pub struct CheckerSettings {
    /// Seconds between checker cycles (default: 90).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Run a cycle immediately on start.
    #[serde(default = "default_true")]
    pub scan_on_start: bool,
}

impl Default for CheckerSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            scan_on_start: default_true(),
        }
    }
}

impl CheckerSettings {
    #[must_use]
    pub fn to_checker_config(&self) -> CheckerConfig {
        CheckerConfig {
            interval: Duration::from_secs(self.interval_secs),
            scan_on_start: self.scan_on_start,
        }
    }
}

/// Offer aggregation settings (`[aggregator]`).
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorSettings {
    /// Upper bound for a single source call in milliseconds (default: 15000).
    #[serde(default = "default_source_timeout_ms")]
    pub source_timeout_ms: u64,
    /// Fill in sample offers when every source comes back empty.
    #[serde(default = "default_true")]
    pub fallback: bool,
    /// Show failed sources as placeholder offers.
    #[serde(default = "default_true")]
    pub diagnostics: bool,
    /// Offers requested per source (default: 10).
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            source_timeout_ms: default_source_timeout_ms(),
            fallback: default_true(),
            diagnostics: default_true(),
            max_results: default_max_results(),
        }
    }
}

impl AggregatorSettings {
    #[must_use]
    pub fn to_aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            source_timeout: Duration::from_millis(self.source_timeout_ms),
            diagnostics: self.diagnostics,
            max_results: self.max_results,
        }
    }
}

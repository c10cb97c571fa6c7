//! Offer source settings (`[sources]`).

use std::time::Duration;

use serde::Deserialize;

use crate::adapter::outbound::source::HttpSourceConfig;

const fn default_true() -> bool {
    true
}

const fn default_timeout_ms() -> u64 {
    15_000
}

/// All configured offer sources, queried in declaration order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    /// Built-in deterministic source.
    #[serde(default)]
    pub stub: StubSourceSettings,
    /// Generic JSON endpoints.
    #[serde(default)]
    pub http: Vec<HttpSourceSettings>,
}

impl SourcesConfig {
    /// Enabled HTTP sources.
    pub fn enabled_http(&self) -> impl Iterator<Item = &HttpSourceSettings> {
        self.http.iter().filter(|source| source.enabled)
    }

    /// Number of sources that will be queried.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        usize::from(self.stub.enabled) + self.enabled_http().count()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StubSourceSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for StubSourceSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

/// One `[[sources.http]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSourceSettings {
    /// Unique source name, shown next to its offers.
    pub name: String,
    /// URL template containing `{query}`.
    pub url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Request timeout in milliseconds (default: 15000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl HttpSourceSettings {
    #[must_use]
    pub fn to_source_config(&self) -> HttpSourceConfig {
        HttpSourceConfig {
            name: self.name.trim().to_string(),
            url: self.url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

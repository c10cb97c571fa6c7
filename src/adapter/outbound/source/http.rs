//! Generic JSON offer source.
//!
//! Queries an HTTP endpoint whose URL template contains a `{query}`
//! placeholder and expects either a bare JSON array of offers or an object
//! wrapping one under `offers`/`items`:
//!
//! ```json
//! [{"title": "iPhone 15", "price": "79 990 ₽", "url": "https://shop/1"}]
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

use crate::domain::{RawOffer, SourceId};
use crate::error::SourceError;
use crate::port::OfferSource;

/// Placeholder replaced by the url-encoded query.
pub const QUERY_PLACEHOLDER: &str = "{query}";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0 Safari/537.36";

/// Connection settings for one HTTP source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Source identifier attached to its offers.
    pub name: String,
    /// URL template containing [`QUERY_PLACEHOLDER`].
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OffersResponse {
    List(Vec<RawOffer>),
    Wrapped {
        #[serde(alias = "items")]
        offers: Vec<RawOffer>,
    },
}

impl OffersResponse {
    fn into_offers(self) -> Vec<RawOffer> {
        match self {
            Self::List(offers) | Self::Wrapped { offers } => offers,
        }
    }
}

/// Offer source backed by a JSON HTTP endpoint.
pub struct HttpJsonSource {
    http: HttpClient,
    id: SourceId,
    url_template: String,
}

impl HttpJsonSource {
    #[must_use]
    pub fn from_config(config: &HttpSourceConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            id: SourceId::new(config.name.clone()),
            url_template: config.url.clone(),
        }
    }

    /// Render the request URL for `query`.
    pub fn request_url(&self, query: &str) -> Result<Url, SourceError> {
        render_url(&self.url_template, query)
    }
}

/// Substitute the url-encoded `query` into `template` and parse the result.
pub fn render_url(template: &str, query: &str) -> Result<Url, SourceError> {
    let encoded: String = form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    Ok(Url::parse(&template.replace(QUERY_PLACEHOLDER, &encoded))?)
}

#[async_trait]
impl OfferSource for HttpJsonSource {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<RawOffer>, SourceError> {
        let url = self.request_url(query)?;
        debug!(source = %self.id, %url, "Fetching offers");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: OffersResponse =
            serde_json::from_str(&body).map_err(|err| SourceError::Decode(err.to_string()))?;

        let mut offers = parsed.into_offers();
        offers.truncate(limit);
        Ok(offers)
    }

    fn id(&self) -> SourceId {
        self.id.clone()
    }

    fn search_url(&self, query: &str) -> Option<String> {
        self.request_url(query).ok().map(String::from)
    }
}

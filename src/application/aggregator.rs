//! Offer aggregation across sources.
//!
//! Fans a query out to every configured [`OfferSource`] concurrently, each
//! call bounded by its own timeout. A failing source contributes nothing
//! (plus an optional diagnostic placeholder) and never aborts the others.
//! When no source yields a usable offer, an optional fallback source fills
//! in with offers tagged [`OfferKind::Fallback`].

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::domain::{Offer, OfferKind, RawOffer, SourceId};
use crate::error::SourceError;
use crate::port::OfferSource;

/// Configuration for the offer aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Upper bound for a single source call.
    pub source_timeout: Duration,
    /// Emit a diagnostic placeholder for each failed source.
    pub diagnostics: bool,
    /// Maximum offers requested from (and kept per) source.
    pub max_results: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(15),
            diagnostics: true,
            max_results: 10,
        }
    }
}

/// A source that failed during one aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: SourceId,
    pub error: String,
}

/// Result of one aggregation.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Normalized offers in source order.
    pub offers: Vec<Offer>,
    /// Sources that failed or timed out.
    pub failures: Vec<SourceFailure>,
    /// Raw offers discarded by normalization.
    pub dropped: usize,
    /// Whether the fallback source supplied the offers.
    pub degraded: bool,
}

impl Aggregation {
    /// Offers that came from a real source.
    pub fn listings(&self) -> impl Iterator<Item = &Offer> {
        self.offers.iter().filter(|offer| offer.is_listing())
    }
}

/// Merges offers from all configured sources for one query.
pub struct OfferAggregator {
    sources: Vec<Arc<dyn OfferSource>>,
    fallback: Option<Arc<dyn OfferSource>>,
    config: AggregatorConfig,
}

impl OfferAggregator {
    /// Create an aggregator over `sources`, queried in the given order.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn OfferSource>>, config: AggregatorConfig) -> Self {
        Self {
            sources,
            fallback: None,
            config,
        }
    }

    /// Use `source` when no configured source yields a usable offer.
    #[must_use]
    pub fn with_fallback(mut self, source: Arc<dyn OfferSource>) -> Self {
        self.fallback = Some(source);
        self
    }

    /// Identifiers of the configured sources, in query order.
    #[must_use]
    pub fn source_ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|source| source.id()).collect()
    }

    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Fetch and normalize offers for `query` from every source.
    pub async fn fetch(&self, query: &str) -> Vec<Offer> {
        self.aggregate(query).await.offers
    }

    /// Like [`Self::fetch`] but also reports failures and degradation.
    pub async fn aggregate(&self, query: &str) -> Aggregation {
        let query = query.trim();
        let mut aggregation = Aggregation::default();
        if query.is_empty() {
            return aggregation;
        }

        let calls = self
            .sources
            .iter()
            .map(|source| self.call(source.as_ref(), query));
        let results = join_all(calls).await;

        for (source, result) in self.sources.iter().zip(results) {
            let id = source.id();
            match result {
                Ok(raw) => self.collect(&mut aggregation, raw, &id),
                Err(err) => {
                    warn!(source = %id, query, error = %err, "Offer source failed");
                    if self.config.diagnostics {
                        let url = source.search_url(query).unwrap_or_default();
                        aggregation
                            .offers
                            .push(Offer::diagnostic(id.clone(), &err.to_string(), url));
                    }
                    aggregation.failures.push(SourceFailure {
                        source: id,
                        error: err.to_string(),
                    });
                }
            }
        }

        let usable = aggregation
            .offers
            .iter()
            .any(|offer| offer.kind != OfferKind::Diagnostic);
        if !usable {
            if let Some(fallback) = &self.fallback {
                self.apply_fallback(&mut aggregation, fallback.as_ref(), query)
                    .await;
            }
        }

        debug!(
            query,
            offers = aggregation.offers.len(),
            failures = aggregation.failures.len(),
            dropped = aggregation.dropped,
            degraded = aggregation.degraded,
            "Aggregated offers"
        );
        aggregation
    }

    async fn call(&self, source: &dyn OfferSource, query: &str) -> Result<Vec<RawOffer>, SourceError> {
        let timeout = self.config.source_timeout;
        match tokio::time::timeout(timeout, source.fetch(query, self.config.max_results)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(timeout)),
        }
    }

    fn collect(&self, aggregation: &mut Aggregation, raw: Vec<RawOffer>, id: &SourceId) {
        let total = raw.len().min(self.config.max_results);
        let before = aggregation.offers.len();
        aggregation.offers.extend(
            raw.into_iter()
                .take(self.config.max_results)
                .filter_map(|offer| offer.normalize(id)),
        );
        aggregation.dropped += total - (aggregation.offers.len() - before);
    }

    async fn apply_fallback(
        &self,
        aggregation: &mut Aggregation,
        fallback: &dyn OfferSource,
        query: &str,
    ) {
        match self.call(fallback, query).await {
            Ok(raw) => {
                let id = fallback.id();
                aggregation.offers.extend(
                    raw.into_iter()
                        .filter_map(|offer| offer.normalize(&id))
                        .map(Offer::into_fallback),
                );
                aggregation.degraded = true;
                warn!(query, "No source produced offers, serving fallback data");
            }
            Err(err) => warn!(query, error = %err, "Fallback source failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::select_best;
    use crate::testkit::source::ScriptedSource;

    fn config() -> AggregatorConfig {
        AggregatorConfig {
            source_timeout: Duration::from_millis(50),
            ..AggregatorConfig::default()
        }
    }

    fn aggregator(sources: Vec<Arc<ScriptedSource>>) -> OfferAggregator {
        let sources = sources
            .into_iter()
            .map(|s| s as Arc<dyn OfferSource>)
            .collect();
        OfferAggregator::new(sources, config())
    }

    #[tokio::test]
    async fn merges_sources_in_order() {
        let a = Arc::new(ScriptedSource::with_prices("a", &[300, 100]));
        let b = Arc::new(ScriptedSource::with_prices("b", &[200]));

        let offers = aggregator(vec![a, b]).fetch("ps5").await;
        let prices: Vec<_> = offers.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![300, 100, 200]);
        assert_eq!(offers[2].source.as_str(), "b");
    }

    #[tokio::test]
    async fn partial_failure_keeps_healthy_source() {
        let down = Arc::new(ScriptedSource::failing("down"));
        let slow = Arc::new(ScriptedSource::hanging("slow"));
        let up = Arc::new(ScriptedSource::with_prices("up", &[90, 80]));

        let aggregation = aggregator(vec![down, slow, up]).aggregate("ps5").await;

        assert_eq!(aggregation.failures.len(), 2);
        assert_eq!(aggregation.listings().count(), 2);
        assert!(!aggregation.degraded);
        let best = select_best(&aggregation.offers).unwrap();
        assert_eq!(best.price, 80);
        assert_eq!(best.source.as_str(), "up");
    }

    #[tokio::test]
    async fn timeout_is_reported_as_failure() {
        let slow = Arc::new(ScriptedSource::hanging("slow"));
        let aggregation = aggregator(vec![slow]).aggregate("ps5").await;

        assert_eq!(aggregation.failures.len(), 1);
        assert!(aggregation.failures[0].error.contains("timed out"));
    }

    #[tokio::test]
    async fn diagnostics_can_be_disabled() {
        let down = Arc::new(ScriptedSource::failing("down"));
        let mut aggregator = aggregator(vec![down]);
        aggregator.config.diagnostics = false;

        let aggregation = aggregator.aggregate("ps5").await;
        assert!(aggregation.offers.is_empty());
        assert_eq!(aggregation.failures.len(), 1);
    }

    #[tokio::test]
    async fn failed_source_leaves_diagnostic() {
        let down = Arc::new(ScriptedSource::failing("down"));
        let offers = aggregator(vec![down]).fetch("ps5").await;

        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].kind, OfferKind::Diagnostic);
        assert!(select_best(&offers).is_none());
    }

    #[tokio::test]
    async fn invalid_offers_are_dropped() {
        let source = Arc::new(ScriptedSource::new(
            "mixed",
            vec![
                RawOffer::new("ok", crate::domain::RawPrice::Integer(10), "https://e.test/1"),
                RawOffer::new("free", crate::domain::RawPrice::Integer(0), "https://e.test/2"),
                RawOffer::new("", crate::domain::RawPrice::Integer(5), "https://e.test/3"),
            ],
        ));

        let aggregation = aggregator(vec![source]).aggregate("x").await;
        assert_eq!(aggregation.offers.len(), 1);
        assert_eq!(aggregation.dropped, 2);
    }

    #[tokio::test]
    async fn fallback_fills_in_when_everything_fails() {
        let down = Arc::new(ScriptedSource::failing("down"));
        let empty = Arc::new(ScriptedSource::with_prices("empty", &[]));
        let fallback = Arc::new(ScriptedSource::with_prices("stub", &[79_990, 82_990]));

        let aggregator = aggregator(vec![down, empty]).with_fallback(fallback);
        let aggregation = aggregator.aggregate("iphone").await;

        assert!(aggregation.degraded);
        let fallback_offers: Vec<_> = aggregation
            .offers
            .iter()
            .filter(|o| o.kind == OfferKind::Fallback)
            .collect();
        assert_eq!(fallback_offers.len(), 2);
        assert!(fallback_offers
            .iter()
            .all(|o| o.source.as_str() == SourceId::FALLBACK));
        assert_eq!(aggregation.listings().count(), 0);
    }

    #[tokio::test]
    async fn fallback_unused_when_a_source_answers() {
        let up = Arc::new(ScriptedSource::with_prices("up", &[10]));
        let fallback = Arc::new(ScriptedSource::with_prices("stub", &[1]));

        let aggregator = aggregator(vec![up]).with_fallback(Arc::clone(&fallback) as _);
        let aggregation = aggregator.aggregate("x").await;

        assert!(!aggregation.degraded);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn blank_query_skips_sources() {
        let source = Arc::new(ScriptedSource::with_prices("a", &[10]));
        let aggregator = aggregator(vec![Arc::clone(&source)]);

        assert!(aggregator.fetch("   ").await.is_empty());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn results_are_capped_per_source() {
        let prices: Vec<u64> = (1..=20).collect();
        let source = Arc::new(ScriptedSource::with_prices("many", &prices));
        let mut aggregator = aggregator(vec![source]);
        aggregator.config.max_results = 5;

        assert_eq!(aggregator.fetch("x").await.len(), 5);
    }
}

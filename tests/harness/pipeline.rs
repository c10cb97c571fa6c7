use std::sync::Arc;
use std::time::Duration;

use pricewatch::application::{
    AggregatorConfig, CheckerConfig, NotificationDeduper, OfferAggregator, PriceChecker,
    WatchRegistry,
};
use pricewatch::port::OfferSource;
use pricewatch::testkit::notifier::RecordingNotifier;

/// Registry, checker and recording notifier wired over the given sources.
pub struct Pipeline {
    pub registry: Arc<WatchRegistry>,
    pub checker: PriceChecker,
    pub notifier: RecordingNotifier,
}

impl Pipeline {
    pub fn new(sources: Vec<Arc<dyn OfferSource>>) -> Self {
        Self::with_aggregator(OfferAggregator::new(sources, fast_aggregator()))
    }

    pub fn with_aggregator(aggregator: OfferAggregator) -> Self {
        let deduper = Arc::new(NotificationDeduper::new());
        let registry = Arc::new(WatchRegistry::new(Arc::clone(&deduper)));
        let notifier = RecordingNotifier::new();
        let checker = PriceChecker::new(
            Arc::clone(&registry),
            deduper,
            Arc::new(aggregator),
            Arc::new(notifier.clone()),
            CheckerConfig::default(),
        );
        Self {
            registry,
            checker,
            notifier,
        }
    }
}

/// Aggregator settings with a short per-source timeout.
pub fn fast_aggregator() -> AggregatorConfig {
    AggregatorConfig {
        source_timeout: Duration::from_millis(200),
        ..AggregatorConfig::default()
    }
}

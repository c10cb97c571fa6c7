//! Application services: watch registry, deduplication, aggregation, and the
//! background price checker.

pub mod aggregator;
pub mod checker;
pub mod dedup;
pub mod dispatcher;
pub mod registry;

pub use aggregator::{AggregatorConfig, Aggregation, OfferAggregator, SourceFailure};
pub use checker::{
    CheckerConfig, CheckerHandle, CheckerState, CycleSummary, PriceChecker, WatchOutcome,
};
pub use dedup::{NotificationDeduper, PendingAlert};
pub use dispatcher::{Command, CommandDispatcher, Reply};
pub use registry::WatchRegistry;

//! Price checker loop.
//!
//! Background service that periodically snapshots the registry, prices every
//! armed watch through the aggregator, and alerts owners whose limit has been
//! reached.
//!
//! # Lifecycle
//!
//! ```text
//! start() ──> Sleeping ──tick──> Scanning ──cycle done──> Sleeping ──> ...
//!                │                                            │
//!                └──────────── shutdown() ────────────────────┴──> Cancelled
//! ```
//!
//! Shutdown is observed at the top of a cycle or during the inter-cycle
//! sleep; a cycle in progress runs to completion. Each cycle works on its own
//! snapshot, so cancelling between cycles cannot leave partial state.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use super::aggregator::OfferAggregator;
use super::dedup::NotificationDeduper;
use super::registry::WatchRegistry;
use crate::domain::{select_best, Offer, WatchEntry};
use crate::error::DeliveryError;
use crate::port::{Notifier, PriceAlert};

/// Configuration for the price checker.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Sleep between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Run the first cycle immediately instead of after one interval.
    pub scan_on_start: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(90),
            scan_on_start: true,
        }
    }
}

/// Observable state of the checker task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerState {
    Sleeping,
    Scanning,
    Cancelled,
}

/// What happened to one watch during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Alert already delivered for this arming.
    AlreadyFired,
    /// No source produced a listing this cycle; retried next cycle.
    NoOffer,
    /// Best listing is still above the limit.
    AboveLimit { best: u64 },
    /// Alert delivered. The key is marked fired unless the watch was
    /// re-armed while the alert was in flight.
    Notified { price: u64 },
    /// Delivery failed; the watch stays armed.
    DeliveryFailed(DeliveryError),
    /// Evaluation panicked; isolated to this watch.
    Failed(String),
}

/// Per-cycle tally, logged once at the end of every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Watches in the cycle's snapshot.
    pub watches: usize,
    /// Distinct normalized queries priced.
    pub queries: usize,
    pub skipped: usize,
    pub no_offer: usize,
    pub above_limit: usize,
    pub notified: usize,
    pub delivery_failed: usize,
    pub failed: usize,
    /// Source failures across all aggregations in the cycle.
    pub source_failures: usize,
}

impl CycleSummary {
    fn record(&mut self, outcome: &WatchOutcome) {
        match outcome {
            WatchOutcome::AlreadyFired => self.skipped += 1,
            WatchOutcome::NoOffer => self.no_offer += 1,
            WatchOutcome::AboveLimit { .. } => self.above_limit += 1,
            WatchOutcome::Notified { .. } => self.notified += 1,
            WatchOutcome::DeliveryFailed(_) => self.delivery_failed += 1,
            WatchOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Best listing per normalized query, shared by watches within one cycle.
type PriceCache = HashMap<String, Option<Offer>>;

/// Periodic evaluator of every registered watch.
pub struct PriceChecker {
    registry: Arc<WatchRegistry>,
    deduper: Arc<NotificationDeduper>,
    aggregator: Arc<OfferAggregator>,
    notifier: Arc<dyn Notifier>,
    config: CheckerConfig,
}

impl PriceChecker {
    /// Create a checker with the given dependencies.
    pub fn new(
        registry: Arc<WatchRegistry>,
        deduper: Arc<NotificationDeduper>,
        aggregator: Arc<OfferAggregator>,
        notifier: Arc<dyn Notifier>,
        config: CheckerConfig,
    ) -> Self {
        Self {
            registry,
            deduper,
            aggregator,
            notifier,
            config,
        }
    }

    /// Run one full pass over a fresh registry snapshot.
    ///
    /// Watches added while the pass runs wait for the next cycle; watches
    /// removed while it runs are still evaluated in this one.
    pub async fn run_cycle(&self) -> CycleSummary {
        let started = Instant::now();
        let snapshot = self.registry.snapshot();
        let mut summary = CycleSummary {
            watches: snapshot.len(),
            ..CycleSummary::default()
        };
        let mut prices = PriceCache::new();

        for entry in &snapshot {
            let evaluation = self.evaluate(entry, &mut prices, &mut summary);
            let outcome = match AssertUnwindSafe(evaluation).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    error!(
                        owner = %entry.owner(),
                        query = entry.query(),
                        reason = %reason,
                        "Watch evaluation panicked"
                    );
                    WatchOutcome::Failed(reason)
                }
            };
            debug!(
                owner = %entry.owner(),
                query = entry.query(),
                limit = entry.limit(),
                ?outcome,
                "Watch evaluated"
            );
            summary.record(&outcome);
        }
        summary.queries = prices.len();

        info!(
            watches = summary.watches,
            queries = summary.queries,
            notified = summary.notified,
            above_limit = summary.above_limit,
            no_offer = summary.no_offer,
            skipped = summary.skipped,
            delivery_failed = summary.delivery_failed,
            failed = summary.failed,
            source_failures = summary.source_failures,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Price check cycle complete"
        );
        summary
    }

    async fn evaluate(
        &self,
        entry: &WatchEntry,
        prices: &mut PriceCache,
        summary: &mut CycleSummary,
    ) -> WatchOutcome {
        let key = entry.key();
        if self.deduper.has_fired(&key) {
            return WatchOutcome::AlreadyFired;
        }

        let best = match prices.get(entry.normalized_query()) {
            Some(best) => best.clone(),
            None => {
                let best = self.best_listing(entry, summary).await;
                prices.insert(entry.normalized_query().to_string(), best.clone());
                best
            }
        };

        let Some(best) = best else {
            return WatchOutcome::NoOffer;
        };
        if best.price > entry.limit() {
            return WatchOutcome::AboveLimit { best: best.price };
        }

        let Some(pending) = self.deduper.begin(&key) else {
            return WatchOutcome::AlreadyFired;
        };
        let price = best.price;
        let alert = PriceAlert::new(entry, best);
        match self.notifier.send(&alert).await {
            Ok(()) => {
                if !self.deduper.complete(pending) {
                    debug!(
                        owner = %entry.owner(),
                        query = entry.query(),
                        limit = entry.limit(),
                        "Watch re-armed during delivery, key left armed"
                    );
                }
                info!(
                    owner = %entry.owner(),
                    query = entry.query(),
                    limit = entry.limit(),
                    price,
                    source = %alert.best.source,
                    "Price alert delivered"
                );
                WatchOutcome::Notified { price }
            }
            Err(err) => {
                self.deduper.abandon(pending);
                warn!(
                    owner = %entry.owner(),
                    query = entry.query(),
                    notifier = self.notifier.name(),
                    error = %err,
                    "Price alert delivery failed, will retry next cycle"
                );
                WatchOutcome::DeliveryFailed(err)
            }
        }
    }

    /// Cheapest real listing for the entry's normalized query, which is also
    /// the cycle cache key. Fallback data never alerts.
    async fn best_listing(&self, entry: &WatchEntry, summary: &mut CycleSummary) -> Option<Offer> {
        let aggregation = self.aggregator.aggregate(entry.normalized_query()).await;
        summary.source_failures += aggregation.failures.len();
        let listings: Vec<Offer> = aggregation
            .offers
            .into_iter()
            .filter(Offer::is_listing)
            .collect();
        select_best(&listings).cloned()
    }

    /// Spawn the checker loop. The returned handle owns its lifecycle.
    pub fn start(self) -> CheckerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (state_tx, state_rx) = watch::channel(CheckerState::Sleeping);

        let task = tokio::spawn(async move {
            let interval = self.config.interval;
            let mut delay = if self.config.scan_on_start {
                Duration::ZERO
            } else {
                interval
            };
            info!(interval_secs = interval.as_secs(), "Price checker started");

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        info!("Price checker shutting down");
                        break;
                    }
                    () = tokio::time::sleep(delay) => {}
                }

                state_tx.send_replace(CheckerState::Scanning);
                self.run_cycle().await;
                state_tx.send_replace(CheckerState::Sleeping);
                delay = interval;
            }

            state_tx.send_replace(CheckerState::Cancelled);
        });

        CheckerHandle {
            shutdown_tx,
            state: state_rx,
            task,
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Handle for controlling the checker lifecycle.
///
/// Dropping the handle also stops the loop at its next cancellation point.
pub struct CheckerHandle {
    shutdown_tx: mpsc::Sender<()>,
    state: watch::Receiver<CheckerState>,
    task: JoinHandle<()>,
}

impl CheckerHandle {
    /// Current state of the loop.
    #[must_use]
    pub fn state(&self) -> CheckerState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CheckerState> {
        self.state.clone()
    }

    /// Signal shutdown and wait for the loop to finish its current cycle.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        let _ = self.shutdown_tx.send(()).await;
        self.task.await
    }
}

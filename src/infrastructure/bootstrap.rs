//! Composition root: turns a [`Config`] into running services.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::notifier::LogNotifier;
#[cfg(feature = "telegram")]
use crate::adapter::outbound::notifier::telegram::{
    run_command_listener, TelegramConfig, TelegramControl, TelegramNotifier,
};
use crate::adapter::outbound::source::{HttpJsonSource, StubSource};
use crate::application::{
    Aggregation, CommandDispatcher, NotificationDeduper, OfferAggregator, PriceChecker,
    WatchRegistry,
};
#[cfg(feature = "telegram")]
use crate::error::ConfigError;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::{Notifier, OfferSource};

/// Build the configured offer sources in query order: stub first, then HTTP.
pub(crate) fn build_sources(config: &Config) -> Vec<Arc<dyn OfferSource>> {
    let mut sources: Vec<Arc<dyn OfferSource>> = Vec::new();
    if config.sources.stub.enabled {
        sources.push(Arc::new(StubSource::default()));
    }
    for settings in config.sources.enabled_http() {
        sources.push(Arc::new(HttpJsonSource::from_config(
            &settings.to_source_config(),
        )));
    }
    if sources.is_empty() {
        warn!("No offer sources enabled");
    }
    sources
}

/// Build the aggregator, adding the stub fallback when configured.
pub(crate) fn build_aggregator(config: &Config) -> OfferAggregator {
    let aggregator = OfferAggregator::new(
        build_sources(config),
        config.aggregator.to_aggregator_config(),
    );
    if config.aggregator.fallback {
        aggregator.with_fallback(Arc::new(StubSource::default()))
    } else {
        aggregator
    }
}

/// Wired application services.
pub struct App {
    config: Config,
    registry: Arc<WatchRegistry>,
    deduper: Arc<NotificationDeduper>,
    aggregator: Arc<OfferAggregator>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl App {
    /// Wire registry, deduper and aggregator from configuration.
    #[must_use]
    pub fn build(config: Config) -> Self {
        let deduper = Arc::new(NotificationDeduper::new());
        let registry = Arc::new(WatchRegistry::new(Arc::clone(&deduper)));
        let aggregator = Arc::new(build_aggregator(&config));

        info!(
            sources = ?aggregator.source_ids(),
            fallback = aggregator.has_fallback(),
            "Offer aggregator ready"
        );

        Self {
            config,
            registry,
            deduper,
            aggregator,
            notifier: None,
        }
    }

    /// Deliver alerts through `notifier` instead of the configured transport.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn registry(&self) -> Arc<WatchRegistry> {
        Arc::clone(&self.registry)
    }

    #[must_use]
    pub fn aggregator(&self) -> Arc<OfferAggregator> {
        Arc::clone(&self.aggregator)
    }

    #[must_use]
    pub fn dispatcher(&self) -> CommandDispatcher {
        CommandDispatcher::new(self.registry(), self.aggregator())
    }

    /// One-shot aggregation for `query`.
    pub async fn search(&self, query: &str) -> Aggregation {
        self.aggregator.aggregate(query).await
    }

    /// Checker over this app's registry, delivering through `notifier`.
    #[must_use]
    pub fn checker(&self, notifier: Arc<dyn Notifier>) -> PriceChecker {
        PriceChecker::new(
            self.registry(),
            Arc::clone(&self.deduper),
            self.aggregator(),
            notifier,
            self.config.checker.to_checker_config(),
        )
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await
    }

    /// Run the checker (and the Telegram front-end when enabled) until
    /// `shutdown` resolves, then stop the checker cleanly.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let (notifier, front_end) = self.build_front_end()?;
        info!(notifier = notifier.name(), "Alert transport ready");

        let handle = self.checker(notifier).start();

        shutdown.await;

        if let Some(front_end) = front_end {
            front_end.abort();
        }
        handle.shutdown().await?;
        info!("Price checker stopped");
        Ok(())
    }

    #[cfg(feature = "telegram")]
    fn build_front_end(
        &self,
    ) -> Result<(Arc<dyn Notifier>, Option<tokio::task::JoinHandle<()>>)> {
        if let Some(notifier) = &self.notifier {
            return Ok((Arc::clone(notifier), None));
        }
        if !self.config.telegram.enabled {
            return Ok((Arc::new(LogNotifier), None));
        }

        let tg_config = TelegramConfig::from_env().ok_or(ConfigError::MissingField {
            field: "TELEGRAM_BOT_TOKEN",
        })?;
        let notifier = TelegramNotifier::new(&tg_config);
        let control = TelegramControl::new(self.dispatcher());
        let listener = tokio::spawn(run_command_listener(notifier.bot(), control));
        info!("Telegram front-end enabled");

        Ok((Arc::new(notifier), Some(listener)))
    }

    #[cfg(not(feature = "telegram"))]
    fn build_front_end(
        &self,
    ) -> Result<(Arc<dyn Notifier>, Option<tokio::task::JoinHandle<()>>)> {
        if let Some(notifier) = &self.notifier {
            return Ok((Arc::clone(notifier), None));
        }
        if self.config.telegram.enabled {
            warn!("Telegram enabled in config but the `telegram` feature is not compiled in");
        }
        Ok((Arc::new(LogNotifier), None))
    }
}

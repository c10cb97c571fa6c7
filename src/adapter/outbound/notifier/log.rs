//! Notifier that writes alerts to the log.
//!
//! Used when no chat transport is configured, e.g. for CLI-only runs.

use async_trait::async_trait;
use tracing::info;

use crate::error::DeliveryError;
use crate::port::{Notifier, PriceAlert};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, alert: &PriceAlert) -> Result<(), DeliveryError> {
        info!(
            owner = %alert.owner,
            query = %alert.query,
            limit = alert.limit,
            price = alert.best.price,
            title = %alert.best.title,
            url = %alert.best.url,
            source = %alert.best.source,
            "Price alert"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Offer, SourceId, UserId, WatchEntry};

    #[tokio::test]
    async fn always_delivers() {
        let entry = WatchEntry::new(UserId::new("1"), "ps5", 100).unwrap();
        let alert = PriceAlert::new(
            &entry,
            Offer::listing("ps5", 90, "https://shop.test/1", SourceId::new("shop")),
        );
        assert_eq!(LogNotifier.send(&alert).await, Ok(()));
        assert_eq!(LogNotifier.name(), "log");
    }
}

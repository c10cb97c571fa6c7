//! Notifier port for price alerts.
//!
//! The checker hands every qualifying watch to a [`Notifier`] and only marks
//! the watch as fired when delivery reports success.

use async_trait::async_trait;

use crate::domain::{Offer, UserId, WatchEntry};
use crate::error::DeliveryError;

/// Alert sent when a watched query reaches its limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceAlert {
    /// Recipient of the alert.
    pub owner: UserId,
    /// Query as the user typed it.
    pub query: String,
    /// The watch's price ceiling.
    pub limit: u64,
    /// Cheapest offer at or under the limit.
    pub best: Offer,
}

impl PriceAlert {
    #[must_use]
    pub fn new(entry: &WatchEntry, best: Offer) -> Self {
        Self {
            owner: entry.owner().clone(),
            query: entry.query().to_string(),
            limit: entry.limit(),
            best,
        }
    }
}

/// Delivery capability for price alerts.
///
/// Implementations must be thread-safe; the checker shares one instance
/// across cycles.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert.
    async fn send(&self, alert: &PriceAlert) -> Result<(), DeliveryError>;

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

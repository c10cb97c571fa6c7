//! Deterministic stub source.
//!
//! Answers every query with the same three offers. Used as an explicitly
//! configured source for demos and as the aggregator's degraded-mode
//! fallback, where its offers are re-tagged so they cannot pass for listings.

use async_trait::async_trait;

use crate::domain::{RawOffer, RawPrice, SourceId};
use crate::error::SourceError;
use crate::port::OfferSource;

const STUB_PRICES: [i64; 3] = [79_990, 82_990, 85_990];

/// Source returning fixed offers derived from the query text.
#[derive(Debug, Clone, Default)]
pub struct StubSource;

impl StubSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OfferSource for StubSource {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<RawOffer>, SourceError> {
        Ok(STUB_PRICES
            .iter()
            .enumerate()
            .take(limit)
            .map(|(i, price)| {
                RawOffer::new(
                    format!("{} (option {})", query.trim(), i + 1),
                    RawPrice::Integer(*price),
                    format!("https://example.com/{}", i + 1),
                )
            })
            .collect())
    }

    fn id(&self) -> SourceId {
        SourceId::new(SourceId::STUB)
    }
}

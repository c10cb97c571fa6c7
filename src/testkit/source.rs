//! Offer source with scripted behavior.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{RawOffer, RawPrice, SourceId};
use crate::error::SourceError;
use crate::port::OfferSource;

#[derive(Debug, Clone)]
enum Script {
    Offers(Vec<RawOffer>),
    Fail(String),
    Hang,
}

/// Source returning canned offers, failing, or never answering.
///
/// The script can be swapped between calls to simulate prices moving.
#[derive(Debug)]
pub struct ScriptedSource {
    id: SourceId,
    script: Mutex<Script>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(id: &str, offers: Vec<RawOffer>) -> Self {
        Self {
            id: SourceId::new(id),
            script: Mutex::new(Script::Offers(offers)),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Source answering with one offer per price.
    pub fn with_prices(id: &str, prices: &[u64]) -> Self {
        Self::new(id, raw_offers(id, prices))
    }

    /// Source whose every call fails.
    pub fn failing(id: &str) -> Self {
        let source = Self::new(id, Vec::new());
        *source.script.lock() = Script::Fail(format!("{id} is down"));
        source
    }

    /// Source that never answers; only a timeout ends the call.
    pub fn hanging(id: &str) -> Self {
        let source = Self::new(id, Vec::new());
        *source.script.lock() = Script::Hang;
        source
    }

    /// Replace the answer with one offer per price.
    pub fn set_prices(&self, prices: &[u64]) {
        *self.script.lock() = Script::Offers(raw_offers(self.id.as_str(), prices));
    }

    /// Make subsequent calls fail.
    pub fn set_failing(&self) {
        *self.script.lock() = Script::Fail(format!("{} is down", self.id));
    }

    /// Number of `fetch` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received by `fetch`, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

fn raw_offers(id: &str, prices: &[u64]) -> Vec<RawOffer> {
    prices
        .iter()
        .enumerate()
        .map(|(i, price)| {
            RawOffer::new(
                format!("{id} offer {}", i + 1),
                RawPrice::Integer(i64::try_from(*price).unwrap_or(i64::MAX)),
                format!("https://{id}.test/item/{}", i + 1),
            )
        })
        .collect()
}

#[async_trait]
impl OfferSource for ScriptedSource {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<RawOffer>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.to_string());
        let script = self.script.lock().clone();
        match script {
            Script::Offers(offers) => Ok(offers.into_iter().take(limit).collect()),
            Script::Fail(reason) => Err(SourceError::Decode(reason)),
            Script::Hang => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        }
    }

    fn id(&self) -> SourceId {
        self.id.clone()
    }
}

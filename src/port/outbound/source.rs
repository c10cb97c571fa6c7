//! Offer source port.

use async_trait::async_trait;

use crate::domain::{RawOffer, SourceId};
use crate::error::SourceError;

/// A provider of candidate offers for a free-text query.
///
/// Sources are stateless with respect to the core: no session or cursor is
/// kept between calls. A failure only removes this source's contribution to
/// one aggregation.
#[async_trait]
pub trait OfferSource: Send + Sync {
    /// Fetch up to `limit` raw offers for `query`.
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<RawOffer>, SourceError>;

    /// Identifier attached to every offer from this source.
    fn id(&self) -> SourceId;

    /// Human-facing page for `query`, used to point diagnostics somewhere.
    fn search_url(&self, _query: &str) -> Option<String> {
        None
    }
}

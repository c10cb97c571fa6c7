//! Best-offer selection.

use super::offer::{Offer, OfferKind};

/// Return the cheapest offer, first-seen on ties.
///
/// Diagnostic placeholders are never selected, so a failed source cannot
/// win even when it is the only thing reported.
#[must_use]
pub fn select_best(offers: &[Offer]) -> Option<&Offer> {
    offers
        .iter()
        .filter(|offer| offer.kind != OfferKind::Diagnostic && offer.price > 0)
        .fold(None, |best: Option<&Offer>, offer| match best {
            Some(current) if current.price <= offer.price => Some(current),
            _ => Some(offer),
        })
}

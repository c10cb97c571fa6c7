//! Domain types: watches, offers, and best-offer selection.
//!
//! Nothing in here performs I/O or holds shared state.

pub mod id;
pub mod offer;
pub mod selector;
pub mod watch;

pub use id::{SourceId, UserId};
pub use offer::{Offer, OfferKind, RawOffer, RawPrice, UNREACHABLE_PRICE};
pub use selector::select_best;
pub use watch::{normalize_query, NotificationKey, WatchEntry};

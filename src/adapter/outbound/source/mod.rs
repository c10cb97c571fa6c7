//! Offer source adapters.
//!
//! Implements the `port::OfferSource` trait for the bundled providers.

pub mod http;
pub mod stub;

pub use http::{HttpJsonSource, HttpSourceConfig};
pub use stub::StubSource;

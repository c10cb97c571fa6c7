//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points of the price tracker. Adapters
//! implement them to plug in offer providers and alert transports.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Registry + Checker     ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                                                       ▼
//! ┌─────────────┐                                       ┌───────────┐
//! │ OfferSource │                                       │ Notifier  │
//! │  Adapters   │                                       │  Adapter  │
//! └─────────────┘                                       └───────────┘
//! ```

pub mod outbound;

pub use outbound::notifier::{Notifier, PriceAlert};
pub use outbound::source::OfferSource;

//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`source`] - [`ScriptedSource`](source::ScriptedSource), an
//!   [`OfferSource`](crate::port::OfferSource) with canned answers.
//! - [`notifier`] - [`RecordingNotifier`](notifier::RecordingNotifier), a
//!   [`Notifier`](crate::port::Notifier) that records alerts and can fail on
//!   demand.

pub mod notifier;
pub mod source;

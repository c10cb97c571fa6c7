//! Outbound adapters: offer providers and alert transports.

pub mod notifier;
pub mod source;

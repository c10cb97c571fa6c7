//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for the supported alert transports.

pub mod log;

#[cfg(feature = "telegram")]
pub mod telegram;

pub use log::LogNotifier;

//! Pricewatch - track product queries across shops and alert on price drops.
//!
//! Users register watches: a search query plus a price ceiling. A background
//! checker periodically asks every configured offer source for that query,
//! picks the cheapest usable offer, and notifies the owner once the price is
//! at or under the ceiling. Each watch fires at most once until it is
//! removed and re-added.
//!
//! # Architecture
//!
//! - **`domain`** - Watches, offers, normalization, best-offer selection
//! - **`port`** - `OfferSource` and `Notifier` traits
//! - **`application`** - Registry, deduper, aggregator, checker, dispatcher
//! - **`adapter`** - Stub and HTTP JSON sources, log and Telegram notifiers
//! - **`infrastructure`** - TOML config, logging, composition root
//! - **`cli`** - `run`, `search`, `check config`
//!
//! # Features
//!
//! - `telegram` (default) - Telegram bot front-end and alert delivery
//! - `testkit` - Scripted sources and recording notifiers for tests
//!
//! # Example
//!
//! ```no_run
//! use pricewatch::infrastructure::{App, Config};
//!
//! # async fn demo() -> pricewatch::error::Result<()> {
//! let app = App::build(Config::load("config.toml")?);
//! let offers = app.search("iphone 15").await;
//! println!("{} offers", offers.offers.len());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

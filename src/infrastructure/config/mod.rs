//! Infrastructure configuration modules.

pub mod logging;
pub mod service;
pub mod settings;
pub mod source;
pub mod telegram;

pub use settings::Config;

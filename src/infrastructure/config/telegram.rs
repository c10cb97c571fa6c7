//! Telegram front-end configuration.

use serde::Deserialize;

/// Telegram configuration (`[telegram]`).
///
/// The bot token is never read from the file; see `TELEGRAM_BOT_TOKEN`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramAppConfig {
    /// Enable the Telegram bot.
    #[serde(default)]
    pub enabled: bool,
}

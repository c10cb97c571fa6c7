//! Telegram alert delivery and command handling.
//!
//! [`TelegramNotifier`] sends price alerts to the chat that owns the watch.
//! [`run_command_listener`] serves the bot commands; the chat id of an
//! incoming message is the owner of the watches it creates.
//!
//! Requires the `telegram` feature to be enabled.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, ParseMode};
use tracing::{debug, error, info, warn};

use crate::domain::UserId;
use crate::error::DeliveryError;
use crate::port::{Notifier, PriceAlert};

use super::command::bot_commands;
use super::control::TelegramControl;
use super::format::format_alert;

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Configuration for the Telegram bot.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token obtained from BotFather.
    pub bot_token: String,
}

impl TelegramConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `TELEGRAM_BOT_TOKEN`. Returns `None` if it is missing or blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var(TOKEN_ENV).ok()?;
        let bot_token = bot_token.trim();
        if bot_token.is_empty() {
            return None;
        }
        Some(Self {
            bot_token: bot_token.to_string(),
        })
    }
}

/// Telegram notifier that sends alerts to the owner's chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    #[must_use]
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            bot: Bot::new(&config.bot_token),
        }
    }

    /// Bot handle shared with the command listener.
    #[must_use]
    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }
}

/// Chat id encoded in an owner identifier.
pub fn chat_id(owner: &UserId) -> Result<ChatId, DeliveryError> {
    owner
        .as_str()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| DeliveryError::InvalidRecipient(owner.to_string()))
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, alert: &PriceAlert) -> Result<(), DeliveryError> {
        let chat = chat_id(&alert.owner)?;
        self.bot
            .send_message(chat, format_alert(alert))
            .parse_mode(ParseMode::MarkdownV2)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        debug!(chat_id = chat.0, query = %alert.query, "Telegram alert sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

/// Serve bot commands until the dispatcher stops (Ctrl-C).
pub async fn run_command_listener(bot: Bot, control: TelegramControl) {
    // Register commands with Telegram so they appear in the "/" menu
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!("Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let control = control.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            let owner = UserId::from(msg.chat.id.0);
            if let Some(response) = control.respond(&owner, text).await {
                if let Err(e) = bot
                    .send_message(msg.chat.id, response)
                    .parse_mode(ParseMode::MarkdownV2)
                    .await
                {
                    error!(error = %e, %owner, "Failed to send Telegram command response");
                }
            }

            respond(())
        }
    })
    .await;

    warn!("Telegram command listener stopped");
}

/// Register bot commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}

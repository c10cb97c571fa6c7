//! Telegram command execution against the watch registry.

use crate::application::{Command, CommandDispatcher, Reply};
use crate::domain::UserId;

use super::command::{command_help, parse_command, CommandParseError, TelegramCommand};
use super::format::{
    escape_markdown, format_error, format_removed, format_search, format_watches, format_watching,
};

/// Translates Telegram commands into dispatcher calls and renders replies.
#[derive(Clone)]
pub struct TelegramControl {
    dispatcher: CommandDispatcher,
}

impl TelegramControl {
    #[must_use]
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Reply (MarkdownV2) for a raw message, or `None` for plain chatter.
    pub async fn respond(&self, owner: &UserId, text: &str) -> Option<String> {
        match parse_command(text) {
            Ok(command) => Some(self.execute(owner, command).await),
            Err(CommandParseError::NotACommand) => None,
            Err(err @ CommandParseError::UnknownCommand(_)) => Some(format!(
                "{}\n\n{}",
                format_error(&err),
                escape_markdown(command_help())
            )),
            Err(err) => Some(format_error(&err)),
        }
    }

    /// Execute a parsed command on behalf of `owner`.
    pub async fn execute(&self, owner: &UserId, command: TelegramCommand) -> String {
        let command = match command {
            TelegramCommand::Start | TelegramCommand::Help => {
                return escape_markdown(command_help());
            }
            TelegramCommand::Watch { query, limit } => Command::Watch { query, limit },
            TelegramCommand::List => Command::List,
            TelegramCommand::Unwatch { index } => Command::Unwatch { index },
            TelegramCommand::Search { query } => Command::Search { query },
        };

        let query = match &command {
            Command::Search { query } => query.trim().to_string(),
            _ => String::new(),
        };

        match self.dispatcher.dispatch(owner, command).await {
            Ok(Reply::Offers(aggregation)) => format_search(&query, &aggregation),
            Ok(Reply::Watching(entry)) => format_watching(&entry),
            Ok(Reply::Removed(entry)) => format_removed(&entry),
            Ok(Reply::Watches(entries)) => format_watches(&entries),
            Err(err) => format_error(&err),
        }
    }
}

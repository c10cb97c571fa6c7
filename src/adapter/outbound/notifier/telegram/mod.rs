//! Telegram bot integration: price alerts out, watch commands in.

mod command;
mod format;

pub mod control;
pub mod notifier;

pub use command::{bot_commands, parse_command, parse_watch_args, CommandParseError, TelegramCommand};
pub use control::TelegramControl;
pub use notifier::{run_command_listener, TelegramConfig, TelegramNotifier};

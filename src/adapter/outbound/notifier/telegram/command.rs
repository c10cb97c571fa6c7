//! Telegram command parsing.

/// Supported Telegram commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelegramCommand {
    Start,
    Help,
    Watch { query: String, limit: i64 },
    List,
    Unwatch { index: String },
    Search { query: String },
}

/// Parse error for Telegram command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidLimit(String),
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
            Self::MissingArgument(name) => write!(f, "missing argument `{name}`"),
            Self::InvalidLimit(value) => write!(f, "invalid price limit `{value}`"),
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a Telegram message into a bot command.
pub fn parse_command(text: &str) -> Result<TelegramCommand, CommandParseError> {
    let text = text.trim_start();
    let (raw_command, rest) = text
        .split_once(char::is_whitespace)
        .unwrap_or((text, ""));
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);
    let rest = rest.trim();

    match command {
        "/start" => Ok(TelegramCommand::Start),
        "/help" => Ok(TelegramCommand::Help),
        "/list" | "/watches" => Ok(TelegramCommand::List),
        "/watch" | "/follow" => {
            let (query, limit) = parse_watch_args(rest)?;
            Ok(TelegramCommand::Watch { query, limit })
        }
        "/unwatch" | "/remove" => {
            let index = rest
                .split_whitespace()
                .next()
                .ok_or(CommandParseError::MissingArgument("number"))?;
            Ok(TelegramCommand::Unwatch {
                index: index.to_string(),
            })
        }
        "/search" | "/find" => {
            if rest.is_empty() {
                return Err(CommandParseError::MissingArgument("query"));
            }
            Ok(TelegramCommand::Search {
                query: rest.to_string(),
            })
        }
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Split `"iphone 15 до 85к"` into `("iphone 15", 85000)`.
///
/// The last numeric word is the limit; a connector word right before it
/// (`до`, `to`, `under`, `below`) is dropped; everything else is the query.
pub fn parse_watch_args(args: &str) -> Result<(String, i64), CommandParseError> {
    let words: Vec<&str> = args.split_whitespace().collect();
    let Some(limit_pos) = words.iter().rposition(|word| looks_numeric(word)) else {
        return Err(if words.is_empty() {
            CommandParseError::MissingArgument("query")
        } else {
            CommandParseError::MissingArgument("limit")
        });
    };
    let limit = parse_limit(words[limit_pos])?;

    let mut query_end = limit_pos;
    if query_end > 0 && is_connector(words[query_end - 1]) {
        query_end -= 1;
    }
    let query = words[..query_end]
        .iter()
        .chain(&words[limit_pos + 1..])
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if query.is_empty() {
        return Err(CommandParseError::MissingArgument("query"));
    }

    Ok((query, limit))
}

fn strip_thousands(word: &str) -> (&str, bool) {
    match word.strip_suffix(|c: char| matches!(c, 'к' | 'К' | 'k' | 'K')) {
        Some(number) => (number, true),
        None => (word, false),
    }
}

fn looks_numeric(word: &str) -> bool {
    let (digits, _) = strip_thousands(word);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn parse_limit(word: &str) -> Result<i64, CommandParseError> {
    let (digits, thousands) = strip_thousands(word);
    let value: i64 = digits
        .parse()
        .map_err(|_| CommandParseError::InvalidLimit(word.to_string()))?;
    let value = if thousands {
        value.checked_mul(1000)
    } else {
        Some(value)
    };
    value.ok_or_else(|| CommandParseError::InvalidLimit(word.to_string()))
}

fn is_connector(word: &str) -> bool {
    matches!(
        word.to_lowercase().as_str(),
        "до" | "to" | "under" | "below" | "<="
    )
}

/// Help text returned by `/start` and `/help`.
#[must_use]
pub const fn command_help() -> &'static str {
    "📋 Commands\n\n\
    /watch <query> <limit> - 👀 Alert me once the price drops to the limit\n\
    /list - 📋 My watches\n\
    /unwatch <n> - 🗑️ Stop watching entry n\n\
    /search <query> - 🔎 Search offers now\n\
    /help - ❓ This help\n\n\
    Examples: /watch iphone 15 до 85к, /watch ps5 50000"
}

/// Bot commands for Telegram menu registration.
///
/// Returns tuples of (command, description) for `set_my_commands`.
#[must_use]
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("watch", "Watch a query until it reaches a price"),
        ("list", "Show my watches"),
        ("unwatch", "Stop watching an entry"),
        ("search", "Search offers now"),
        ("help", "Show all commands"),
    ]
}

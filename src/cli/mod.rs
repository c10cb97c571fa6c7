//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod run;
pub mod search;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "config.toml";

/// Pricewatch - track product prices across shops and get alerted on drops.
#[derive(Parser, Debug)]
#[command(name = "pricewatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the price checker and, if enabled, the Telegram bot
    Run(RunArgs),

    /// Search all sources once and print the offers
    Search(SearchArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `pricewatch check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file [default: config.toml if present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file [default: config.toml if present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `search` subcommand.
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// What to search for
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Path to configuration file [default: config.toml if present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl SearchArgs {
    #[must_use]
    pub fn query(&self) -> String {
        self.query.join(" ")
    }
}

/// Load the explicit config file, or `config.toml` when it exists, or defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load(DEFAULT_CONFIG),
        None => Ok(Config::default()),
    }
}

/// Execute a parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Search(args) => search::execute(&args).await,
        Commands::Check(CheckCommand::Config(args)) => check::execute_config(args.config.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_overrides() {
        let cli = Cli::parse_from([
            "pricewatch",
            "run",
            "-c",
            "custom.toml",
            "--log-level",
            "debug",
            "--json-logs",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config.as_deref(), Some(Path::new("custom.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
    }

    #[test]
    fn search_joins_query_words() {
        let cli = Cli::parse_from(["pricewatch", "search", "iphone", "15", "pro"]);
        let Commands::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.query(), "iphone 15 pro");
        assert!(args.config.is_none());
    }

    #[test]
    fn search_requires_query() {
        assert!(Cli::try_parse_from(["pricewatch", "search"]).is_err());
    }

    #[test]
    fn parses_check_config() {
        let cli = Cli::parse_from(["pricewatch", "check", "config", "--config", "a.toml"]);
        assert!(matches!(
            cli.command,
            Commands::Check(CheckCommand::Config(ConfigPathArg { config: Some(_) }))
        ));
    }
}

//! Configuration validation command.

use std::path::Path;

use crate::cli::{load_config, output, DEFAULT_CONFIG};
use crate::error::Result;

/// Validate configuration file without starting the checker.
pub fn execute_config(config_path: Option<&Path>) -> Result<()> {
    let shown = config_path.map_or_else(
        || format!("{DEFAULT_CONFIG} (defaults if missing)"),
        |path| path.display().to_string(),
    );
    println!("Checking configuration: {shown}");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            output::error(&e.to_string());
            return Err(e);
        }
    };
    output::ok("Configuration is valid");

    output::section("Checker");
    output::key_value("Interval", format!("{}s", config.checker.interval_secs));
    output::key_value("Scan on start", config.checker.scan_on_start);

    output::section("Sources");
    output::key_value("Stub", enabled(config.sources.stub.enabled));
    for source in &config.sources.http {
        output::key_value(
            &source.name,
            format!("{} ({}, {}ms)", enabled(source.enabled), source.url, source.timeout_ms),
        );
    }
    output::key_value("Timeout", format!("{}ms", config.aggregator.source_timeout_ms));
    output::key_value("Fallback", enabled(config.aggregator.fallback));
    output::key_value("Diagnostics", enabled(config.aggregator.diagnostics));
    if config.sources.enabled_count() == 0 {
        output::warn("No offer sources enabled");
    }

    output::section("Telegram");
    if config.telegram.enabled {
        if std::env::var("TELEGRAM_BOT_TOKEN").is_ok_and(|token| !token.trim().is_empty()) {
            output::ok("Telegram configured and enabled");
        } else {
            output::warn("Telegram enabled but TELEGRAM_BOT_TOKEN is not set");
        }
    } else {
        output::key_value("Telegram", "disabled");
    }

    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

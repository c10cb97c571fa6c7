//! Handler for the `run` command.

use tracing::info;

use crate::cli::{load_config, RunArgs};
use crate::error::Result;
use crate::infrastructure::App;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    // Apply CLI overrides
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }

    config.init_logging();

    info!(
        interval_secs = config.checker.interval_secs,
        sources = config.sources.enabled_count(),
        telegram = config.telegram.enabled,
        "pricewatch starting"
    );

    App::build(config).run().await?;

    info!("pricewatch stopped");
    Ok(())
}

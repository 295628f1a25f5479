use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::MonitoringConfig;

/// Install the global subscriber. Output goes to stderr so rendered
/// reports on stdout can be piped without log noise.
pub fn init_logging(config: &MonitoringConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if config.json {
        builder
            .json()
            .with_file(true)
            .with_line_number(true)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;
    } else {
        builder
            .compact()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;
    }

    Ok(())
}

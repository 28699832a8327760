use std::io::stderr;

use anyhow::anyhow;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// progress and the final report.
pub fn setup_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(stderr)
            .try_init(),
        LogFormat::Compact => {
            let format = fmt::format()
                .with_target(true)
                .with_thread_ids(true)
                .compact();

            tracing_subscriber::fmt()
                .event_format(format)
                .with_env_filter(env_filter)
                .with_writer(stderr)
                .try_init()
        }
    }
    .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

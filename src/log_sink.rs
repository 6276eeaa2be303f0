// Purpose: Install the process-wide tracing subscriber

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// `RUST_LOG` wins over the configured level when both are present.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let _ = fmt()
        .with_env_filter(env_filter(config))
        .with_target(false)
        .try_init();
}

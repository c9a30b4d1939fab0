//! Bootstrap utilities for logfeed binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "LOGFEED_LOG";

/// Initialize tracing with LOGFEED_LOG environment variable.
///
/// Defaults to "info" level if LOGFEED_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

//! Registration configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default number of catalog writes per registration, the first included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default catalog stream for projection registrations.
pub const DEFAULT_CATALOG_STREAM: &str = "$projections-$all";

/// Default cap on the delay between reissued writes, in milliseconds.
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 1000;

/// Bounded-retry settings for catalog registration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Total writes issued before giving up on transient failures.
    ///
    /// Default: 2 (one reissue).
    pub max_attempts: u32,

    /// Stream registrations are appended to.
    pub catalog_stream: String,

    /// Initial delay before a reissue. Zero reissues immediately.
    ///
    /// Default: 0 ms.
    pub retry_delay_ms: u64,

    /// Upper bound for the exponentially growing reissue delay.
    ///
    /// Default: 1000 ms.
    pub max_retry_delay_ms: u64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            catalog_stream: DEFAULT_CATALOG_STREAM.to_string(),
            retry_delay_ms: 0,
            max_retry_delay_ms: DEFAULT_MAX_RETRY_DELAY_MS,
        }
    }
}

impl RegistrationConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_catalog_stream(mut self, stream: impl Into<String>) -> Self {
        self.catalog_stream = stream.into();
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }
}

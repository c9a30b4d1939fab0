//! Retry utilities: backoff builders for reissued catalog writes.
//!
//! Uses `backon` for exponential backoff with jitter.

use backon::ExponentialBuilder;

use crate::registration::RegistrationConfig;

/// Backoff spacing reissued registration writes.
///
/// - Min delay: `retry_delay_ms` (0 reissues immediately)
/// - Max delay: `max_retry_delay_ms`
/// - Max delays: `max_attempts`, so the schedule never runs out first
/// - Jitter enabled
pub fn registration_backoff(config: &RegistrationConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(config.retry_delay())
        .with_max_delay(config.max_retry_delay())
        .with_max_times(config.max_attempts as usize)
        .with_jitter()
}
